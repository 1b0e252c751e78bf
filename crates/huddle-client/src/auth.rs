//! Sign-in / sign-up screen.
//!
//! The form is cosmetic: no credentials are checked or sent anywhere, and
//! submitting always enters the home area.

use tracing::info;

use crate::routes::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub show_password: bool,
}

impl AuthForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch between sign-in and sign-up. Field contents are kept.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
    }

    pub fn toggle_password_visibility(&mut self) {
        self.show_password = !self.show_password;
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            AuthMode::SignIn => "Welcome Back",
            AuthMode::SignUp => "Create Account",
        }
    }

    /// The confirmation field is only part of the sign-up form.
    pub fn shows_confirmation(&self) -> bool {
        self.mode == AuthMode::SignUp
    }

    /// Password as it should be displayed.
    pub fn masked_password(&self) -> String {
        if self.show_password {
            self.password.clone()
        } else {
            "*".repeat(self.password.chars().count())
        }
    }

    pub fn submit(&self) -> Route {
        info!(mode = ?self.mode, email = %self.email, "Auth form submitted");
        Route::Home
    }
}
