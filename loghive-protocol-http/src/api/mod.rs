pub mod auth;
pub mod entries;
pub mod info;

use poem::session::Session;

static USERNAME_SESSION_KEY: &str = "username";

pub trait SessionExt {
    fn get_viewer(&self) -> Option<String>;
    fn set_viewer(&self, viewer: String);
}

impl SessionExt for Session {
    fn get_viewer(&self) -> Option<String> {
        self.get(USERNAME_SESSION_KEY)
    }

    fn set_viewer(&self, viewer: String) {
        self.set(USERNAME_SESSION_KEY, viewer);
    }
}
