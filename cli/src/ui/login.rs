//! Login / register form state.

pub const LOGIN_FAILED: &str = "Invalid email or password.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMode {
    #[default]
    Login,
    Register,
}

impl LoginMode {
    pub fn title(&self) -> &'static str {
        match self {
            LoginMode::Login => "Login",
            LoginMode::Register => "Register",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub mode: LoginMode,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub field: LoginField,
    pub mode: LoginMode,
    pub error: Option<String>,
    pub info: Option<String>,
    busy: bool,
}

impl LoginForm {
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Validates presence of both fields and marks the form busy. Returns
    /// `None` while a submit is already running.
    pub fn begin_submit(&mut self) -> Option<Credentials> {
        if self.busy {
            return None;
        }
        self.info = None;
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            self.error = Some("Username and password are required".to_string());
            return None;
        }
        self.error = None;
        self.busy = true;
        Some(Credentials {
            mode: self.mode,
            username: username.to_string(),
            password: self.password.clone(),
        })
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.busy = false;
        self.password.clear();
        self.error = Some(message.into());
    }

    /// A login went through; forget what was typed.
    pub fn succeeded(&mut self) {
        *self = LoginForm::default();
    }

    /// A registration went through; back to login with the username kept.
    pub fn finish_register(&mut self) {
        self.busy = false;
        self.password.clear();
        self.mode = LoginMode::Login;
        self.field = LoginField::Password;
        self.error = None;
        self.info = Some("Account created, you can log in now".to_string());
    }

    pub fn toggle_mode(&mut self) {
        if self.busy {
            return;
        }
        self.mode = match self.mode {
            LoginMode::Login => LoginMode::Register,
            LoginMode::Register => LoginMode::Login,
        };
        self.error = None;
        self.info = None;
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.field {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn input_char(&mut self, c: char) {
        if !self.busy {
            self.focused_mut().push(c);
        }
    }

    pub fn backspace(&mut self) {
        if !self.busy {
            self.focused_mut().pop();
        }
    }

    pub fn masked_password(&self) -> String {
        "*".repeat(self.password.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(username: &str, password: &str) -> LoginForm {
        let mut form = LoginForm::default();
        username.chars().for_each(|c| form.input_char(c));
        form.next_field();
        password.chars().for_each(|c| form.input_char(c));
        form
    }

    #[test]
    fn both_fields_are_required() {
        let mut form = filled("admin", "");
        assert!(form.begin_submit().is_none());
        assert!(form.error.is_some());
        assert!(!form.is_busy());

        let mut form = filled("   ", "secret");
        assert!(form.begin_submit().is_none());
    }

    #[test]
    fn submit_trims_username_and_blocks_repeats() {
        let mut form = filled(" admin ", "secret");
        let creds = form.begin_submit().unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "secret");
        assert_eq!(creds.mode, LoginMode::Login);

        assert!(form.begin_submit().is_none());
        form.input_char('x');
        assert_eq!(form.password, "secret");
    }

    #[test]
    fn failure_clears_password_and_allows_retry() {
        let mut form = filled("admin", "wrong");
        form.begin_submit().unwrap();
        form.fail(LOGIN_FAILED);

        assert_eq!(form.error.as_deref(), Some(LOGIN_FAILED));
        assert!(form.password.is_empty());
        assert!(!form.is_busy());
    }

    #[test]
    fn registration_returns_to_login() {
        let mut form = filled("new", "pw");
        form.toggle_mode();
        assert_eq!(form.begin_submit().unwrap().mode, LoginMode::Register);
        form.finish_register();

        assert_eq!(form.mode, LoginMode::Login);
        assert_eq!(form.username, "new");
        assert!(form.password.is_empty());
        assert!(form.info.is_some());
    }

    #[test]
    fn password_is_masked() {
        let form = filled("a", "pässwd");
        assert_eq!(form.masked_password(), "******");
    }
}
