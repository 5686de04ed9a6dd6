use secrecy::SecretString;

/// Supabase project settings shared by the web layer and the reconciler.
#[derive(Clone)]
pub struct GlobalArgs {
    pub supabase_url: String,
    pub supabase_anon_key: SecretString,
    pub supabase_service_key: Option<SecretString>,
    pub profile_table: String,
    pub secure_cookie: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(supabase_url: String, supabase_anon_key: SecretString) -> Self {
        Self {
            supabase_url,
            supabase_anon_key,
            supabase_service_key: None,
            profile_table: "teachers".to_string(),
            secure_cookie: true,
        }
    }

    pub fn set_service_key(&mut self, key: SecretString) {
        self.supabase_service_key = Some(key);
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"***")
            .field(
                "supabase_service_key",
                &self.supabase_service_key.as_ref().map(|_| "***"),
            )
            .field("profile_table", &self.profile_table)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}
