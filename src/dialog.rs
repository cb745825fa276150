use std::future::Future;

use validator::{Validate, ValidationErrors};

use crate::error::AppError;
use crate::notify::Notifier;
use crate::query::QueryClient;

#[derive(Clone, Default)]
pub struct MutationContext {
    pub queries: QueryClient,
    pub notifier: Notifier,
}

impl MutationContext {
    pub fn new(queries: QueryClient, notifier: Notifier) -> Self {
        MutationContext { queries, notifier }
    }

    fn succeeded(&self, resources: &[&'static str], message: &str) {
        for resource in resources {
            self.queries.invalidate(resource);
        }
        self.notifier.success(message);
    }

    fn failed(&self, error: &AppError) {
        self.notifier.error(error.user_message());
    }
}

#[derive(Debug)]
pub enum SubmitOutcome<R> {
    Saved(R),
    /// Rejected before any request was made.
    Invalid(ValidationErrors),
    Failed(AppError),
}

impl<R> SubmitOutcome<R> {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmitOutcome::Saved(_))
    }

    pub fn into_result(self) -> Result<R, AppError> {
        match self {
            SubmitOutcome::Saved(r) => Ok(r),
            SubmitOutcome::Invalid(errors) => Err(AppError::Validation(errors)),
            SubmitOutcome::Failed(e) => Err(e),
        }
    }
}

pub struct FormDialog<F> {
    open: bool,
    values: F,
    errors: Option<ValidationErrors>,
    invalidates: &'static [&'static str],
}

impl<F> FormDialog<F>
where
    F: Validate + Clone + Default,
{
    /// `invalidates` lists the resources a successful submit makes stale.
    pub fn new(invalidates: &'static [&'static str]) -> Self {
        FormDialog {
            open: false,
            values: F::default(),
            errors: None,
            invalidates,
        }
    }

    /// Open empty, for a create.
    pub fn open(&mut self) {
        self.open_with(F::default());
    }

    /// Open prefilled, for an edit.
    pub fn open_with(&mut self, values: F) {
        self.values = values;
        self.errors = None;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.values = F::default();
        self.errors = None;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn values(&self) -> &F {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut F {
        &mut self.values
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    pub async fn submit<R, Op, Fut>(
        &mut self,
        ctx: &MutationContext,
        success: &str,
        op: Op,
    ) -> SubmitOutcome<R>
    where
        Op: FnOnce(F) -> Fut,
        Fut: Future<Output = Result<R, AppError>>,
    {
        if let Err(errors) = self.values.validate() {
            tracing::debug!(?errors, "form rejected");
            self.errors = Some(errors.clone());
            return SubmitOutcome::Invalid(errors);
        }
        self.errors = None;

        match op(self.values.clone()).await {
            Ok(saved) => {
                ctx.succeeded(self.invalidates, success);
                self.close();
                SubmitOutcome::Saved(saved)
            }
            Err(e) => {
                ctx.failed(&e);
                SubmitOutcome::Failed(e)
            }
        }
    }
}

#[derive(Debug)]
pub enum ConfirmOutcome<R> {
    NothingPending,
    Done(R),
    Failed(AppError),
}

impl<R> ConfirmOutcome<R> {
    pub fn into_result(self) -> Result<Option<R>, AppError> {
        match self {
            ConfirmOutcome::NothingPending => Ok(None),
            ConfirmOutcome::Done(r) => Ok(Some(r)),
            ConfirmOutcome::Failed(e) => Err(e),
        }
    }
}

/// Two-step destructive action.
pub struct ConfirmDialog<T> {
    pending: Option<T>,
    invalidates: &'static [&'static str],
}

impl<T: Clone> ConfirmDialog<T> {
    pub fn new(invalidates: &'static [&'static str]) -> Self {
        ConfirmDialog {
            pending: None,
            invalidates,
        }
    }

    pub fn request(&mut self, target: T) {
        self.pending = Some(target);
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Runs `op` once on the pending target. A failure keeps the dialog open.
    pub async fn confirm<R, Op, Fut>(
        &mut self,
        ctx: &MutationContext,
        success: &str,
        op: Op,
    ) -> ConfirmOutcome<R>
    where
        Op: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<R, AppError>>,
    {
        let Some(target) = self.pending.clone() else {
            return ConfirmOutcome::NothingPending;
        };
        match op(target).await {
            Ok(done) => {
                self.pending = None;
                ctx.succeeded(self.invalidates, success);
                ConfirmOutcome::Done(done)
            }
            Err(e) => {
                ctx.failed(&e);
                ConfirmOutcome::Failed(e)
            }
        }
    }
}
