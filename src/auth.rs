use async_trait::async_trait;
use pgwire::api::auth::{AuthSource, LoginInfo, Password};
use pgwire::error::{ErrorInfo, PgWireError, PgWireResult};

/// Cleartext password check for the operator login.
///
/// With `user` set, logins under any other user name are refused before the
/// password is compared.
#[derive(Debug, Clone)]
pub struct OperatorAuthSource {
    user: Option<String>,
    password: String,
}

impl OperatorAuthSource {
    pub fn new(user: Option<String>, password: String) -> Self {
        Self { user, password }
    }

    fn admits(&self, login_user: Option<&str>) -> bool {
        match &self.user {
            Some(expected) => login_user == Some(expected.as_str()),
            None => true,
        }
    }
}

#[async_trait]
impl AuthSource for OperatorAuthSource {
    async fn get_password(&self, login: &LoginInfo) -> PgWireResult<Password> {
        let user = login.user();
        if !self.admits(user) {
            metrics::counter!(crate::observability::AUTH_FAILURES_TOTAL).increment(1);
            tracing::warn!("login refused for user {user:?}");
            return Err(PgWireError::UserError(Box::new(ErrorInfo::new(
                "FATAL".into(),
                "28000".into(),
                format!("unknown user {:?}", user.unwrap_or_default()),
            ))));
        }
        Ok(Password::new(None, self.password.as_bytes().to_vec()))
    }
}
