//! Gateway paths, relative to the configured base URL.

pub mod auth {
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const LOGOUT: &str = "/logout";
    pub const REFRESH: &str = "/refresh";
    pub const PROFILE: &str = "/user";
    pub const VERIFY_EMAIL: &str = "/verify";
    pub const FORGOT_PASSWORD: &str = "/forgot";
    pub const RESET_PASSWORD: &str = "/reset";
}

pub mod problems {
    pub const ALL: &str = "/problems";

    pub fn id(id: &str) -> String {
        format!("/problems/{id}")
    }
}

pub mod submissions {
    pub const ALL: &str = "/submission";

    pub fn id(id: &str) -> String {
        format!("/submission/{id}")
    }

    pub fn ai(id: &str) -> String {
        format!("/submission/ai/{id}")
    }
}
