use crate::api::ApiClient;
use crate::dialog::{FormDialog, MutationContext, SubmitOutcome};
use crate::error::AppError;
use crate::forms::LoginForm;
use crate::models::Admin;
use crate::shell;

/// The sign-in page. A successful login fills the session store; a failed
/// one leaves the typed credentials in place.
pub struct SignIn {
    api: ApiClient,
    ctx: MutationContext,
    pub form: FormDialog<LoginForm>,
    redirect: Option<String>,
}

impl SignIn {
    /// `redirect` is the guarded path that sent the operator here.
    pub fn new(api: ApiClient, ctx: MutationContext, redirect: Option<String>) -> Self {
        let mut form = FormDialog::new(&[]);
        form.open();
        SignIn {
            api,
            ctx,
            form,
            redirect,
        }
    }

    pub async fn submit(&mut self) -> SubmitOutcome<Admin> {
        let api = self.api.clone();
        self.form
            .submit(&self.ctx, "Signed in successfully", |form| async move {
                let response = api.login(form.username.trim(), &form.password).await?;
                api.session()
                    .set_auth(response.token, response.admin.clone())?;
                Ok::<_, AppError>(response.admin)
            })
            .await
    }

    pub fn destination(&self) -> String {
        shell::after_sign_in(self.redirect.as_deref())
    }
}
