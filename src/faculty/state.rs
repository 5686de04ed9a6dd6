use crate::provisioning::{AccountProvisioner, LoginFlow};

use super::form::InFlight;

/// Everything the page handlers need, shared through an `Extension`.
#[derive(Clone)]
pub struct AppState {
    provisioner: AccountProvisioner,
    login: LoginFlow,
    in_flight: InFlight,
    secure_cookie: bool,
}

impl AppState {
    #[must_use]
    pub fn new(provisioner: AccountProvisioner, login: LoginFlow) -> Self {
        Self {
            provisioner,
            login,
            in_flight: InFlight::new(),
            secure_cookie: true,
        }
    }

    #[must_use]
    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    #[must_use]
    pub fn provisioner(&self) -> &AccountProvisioner {
        &self.provisioner
    }

    #[must_use]
    pub fn login(&self) -> &LoginFlow {
        &self.login
    }

    #[must_use]
    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    #[must_use]
    pub fn secure_cookie(&self) -> bool {
        self.secure_cookie
    }
}
