use serde::Serialize;

/// Static profile of the local user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub joined: String,
    pub bio: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "John Doe".into(),
            email: "john.doe@example.com".into(),
            phone: "+1 (555) 123-4567".into(),
            location: "San Francisco, CA".into(),
            joined: "January 2024".into(),
            bio: "Software developer passionate about creating seamless chat experiences.".into(),
        }
    }
}

impl UserProfile {
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// First letter of the first two words, uppercased.
    pub fn initials(&self) -> String {
        initials(&self.name)
    }
}

pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials() {
        assert_eq!(UserProfile::default().initials(), "JD");
        assert_eq!(initials("ada"), "A");
        assert_eq!(initials("mary ann  van dyke"), "MA");
        assert_eq!(initials("  "), "");
    }
}
