use crate::application::distributor::DepositDistributor;
use crate::domain::deposit::{CallContext, DepositRequest};
use crate::error::DepositError;
use tracing::warn;
use uuid::Uuid;

/// Optional headers accompanying an inbound call, each defaulted when absent.
#[derive(Debug, Clone, Default)]
pub struct RequestHeaders {
    pub request_id: Option<String>,
    pub created_by: Option<String>,
    pub reason: Option<String>,
    pub comment: Option<String>,
}

/// Reuses the correlation id as the call's tracking token when it parses as a
/// UUID; otherwise allocates a random one.
pub fn user_token(request_id: Option<&str>) -> Uuid {
    request_id
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .unwrap_or_else(Uuid::new_v4)
}

impl RequestHeaders {
    pub fn into_call_context(self, tenant_id: Uuid) -> CallContext {
        CallContext {
            user_token: user_token(self.request_id.as_deref()),
            created_by: self.created_by.unwrap_or_else(|| crate::PLUGIN_NAME.to_owned()),
            reason: self.reason,
            comment: self.comment,
            tenant_id,
        }
    }
}

/// Stable outcome category of an inbound call, with its HTTP status analog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCategory {
    Created,
    BadRequest,
    NotFound,
    Unprocessable,
    ServerError,
}

impl ResponseCategory {
    pub fn status_code(self) -> u16 {
        match self {
            ResponseCategory::Created => 201,
            ResponseCategory::BadRequest => 400,
            ResponseCategory::NotFound => 404,
            ResponseCategory::Unprocessable => 422,
            ResponseCategory::ServerError => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResponseCategory::Created => "created",
            ResponseCategory::BadRequest => "bad-request",
            ResponseCategory::NotFound => "not-found",
            ResponseCategory::Unprocessable => "unprocessable",
            ResponseCategory::ServerError => "server-error",
        }
    }
}

impl From<&DepositError> for ResponseCategory {
    fn from(e: &DepositError) -> Self {
        match e {
            DepositError::Validation(_) => ResponseCategory::BadRequest,
            DepositError::AccountNotFound(_) | DepositError::InvoiceNotFound(_) => {
                ResponseCategory::NotFound
            }
            DepositError::ControlRejected { .. } => ResponseCategory::Unprocessable,
            DepositError::Storage(_) | DepositError::Upstream(_) | DepositError::Unsupported(_) => {
                ResponseCategory::ServerError
            }
        }
    }
}

/// Entry point for the inbound "record deposits" call.
pub struct DepositApi {
    distributor: DepositDistributor,
}

impl DepositApi {
    pub fn new(distributor: DepositDistributor) -> Self {
        Self { distributor }
    }

    pub async fn record_deposits(
        &self,
        request: &DepositRequest,
        headers: RequestHeaders,
        tenant_id: Uuid,
    ) -> ResponseCategory {
        let ctx = headers.into_call_context(tenant_id);
        match self.distributor.record_deposits(request, &ctx).await {
            Ok(()) => ResponseCategory::Created,
            Err(e) => {
                let category = ResponseCategory::from(&e);
                if category == ResponseCategory::ServerError {
                    warn!(error = %e, "deposit request failed");
                }
                category
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_user_token_reuses_valid_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(user_token(Some(&id.to_string())), id);
    }

    #[test]
    fn test_user_token_generates_on_invalid_or_absent() {
        let generated = user_token(Some("not-a-uuid"));
        assert_ne!(generated, Uuid::nil());
        let absent = user_token(None);
        assert_ne!(absent, generated);
    }

    #[test]
    fn test_headers_defaults() {
        let tenant_id = Uuid::new_v4();
        let ctx = RequestHeaders::default().into_call_context(tenant_id);
        assert_eq!(ctx.created_by, crate::PLUGIN_NAME);
        assert_eq!(ctx.reason, None);
        assert_eq!(ctx.comment, None);
        assert_eq!(ctx.tenant_id, tenant_id);
    }

    #[test]
    fn test_error_category_mapping() {
        assert_eq!(
            ResponseCategory::from(&DepositError::Validation("x".to_owned())),
            ResponseCategory::BadRequest
        );
        assert_eq!(
            ResponseCategory::from(&DepositError::AccountNotFound(Uuid::new_v4())),
            ResponseCategory::NotFound
        );
        assert_eq!(
            ResponseCategory::from(&DepositError::InvoiceNotFound(999)),
            ResponseCategory::NotFound
        );
        assert_eq!(
            ResponseCategory::from(&DepositError::ControlRejected {
                amount: dec!(0.49),
                minimum: dec!(0.50),
            }),
            ResponseCategory::Unprocessable
        );
        assert_eq!(
            ResponseCategory::from(&DepositError::Storage("boom".to_owned())),
            ResponseCategory::ServerError
        );
        assert_eq!(ResponseCategory::Unprocessable.status_code(), 422);
    }
}
