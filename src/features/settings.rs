use crate::api::users::ADMINS;
use crate::api::{Ack, ApiClient};
use crate::dialog::{FormDialog, MutationContext, SubmitOutcome};
use crate::error::AppError;
use crate::forms::{AdminForm, ProfileForm};
use crate::models::admin::{AdminRegistration, ProfileUpdate};
use crate::models::{Admin, UserRole};

pub struct ProfilePage {
    api: ApiClient,
    ctx: MutationContext,
    pub form: FormDialog<ProfileForm>,
}

impl ProfilePage {
    pub fn new(api: ApiClient, ctx: MutationContext) -> Self {
        ProfilePage {
            api,
            ctx,
            form: FormDialog::new(&[]),
        }
    }

    /// Prefill the form from `GET /auth/profile`.
    pub async fn load(&mut self) -> Result<Admin, AppError> {
        let admin = self.api.get_profile().await?;
        self.form.open_with(ProfileForm {
            username: admin.username.clone(),
            email: admin.email.clone(),
            bio: None,
        });
        Ok(admin)
    }

    /// On success the header identity is re-read from `GET /auth/profile`.
    pub async fn save(&mut self) -> SubmitOutcome<Ack> {
        let api = self.api.clone();
        self.form
            .submit(&self.ctx, "Profile updated successfully", |form| async move {
                let ack = api.update_profile(&ProfileUpdate::from(form)).await?;
                let profile = api.get_profile().await?;
                api.session().refresh_identity(profile)?;
                Ok(ack)
            })
            .await
    }
}

/// Which operator-account endpoint an [`AdminAccountForm`] posts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    /// `POST /auth/register`, by a signed-in super admin.
    Register,
    /// `POST /auth/setup`, once, before any operator exists.
    Setup,
}

pub struct AdminAccountForm {
    api: ApiClient,
    ctx: MutationContext,
    kind: AccountKind,
    pub form: FormDialog<AdminForm>,
}

impl AdminAccountForm {
    pub fn new(api: ApiClient, ctx: MutationContext, kind: AccountKind) -> Self {
        let mut form = FormDialog::new(&[ADMINS]);
        form.open();
        AdminAccountForm {
            api,
            ctx,
            kind,
            form,
        }
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub async fn submit(&mut self) -> SubmitOutcome<Ack> {
        let api = self.api.clone();
        match self.kind {
            AccountKind::Register => {
                self.form
                    .submit(&self.ctx, "Admin created successfully", |form| async move {
                        api.create_admin(&AdminRegistration::from(form)).await
                    })
                    .await
            }
            AccountKind::Setup => {
                self.form
                    .submit(&self.ctx, "Super admin created successfully", |form| async move {
                        let mut registration = AdminRegistration::from(form);
                        registration.role = Some(UserRole::Superadmin);
                        api.setup_super_admin(&registration).await
                    })
                    .await
            }
        }
    }
}
