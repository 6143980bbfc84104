/// gRPC validation gateway.
///
/// Exposes a single ValidateToken operation with the same decision semantics
/// as the HTTP bearer path: same TokenService, same revocation cache, no
/// divergent logic. An invalid token is a normal `valid=false` response —
/// transport-level failures are reserved for infrastructure faults.
use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::debug;

use token_core::{TokenError, TokenService, TokenType};

use crate::arclight::auth::v1::{
    token_validation_server::TokenValidation, ValidateTokenRequest, ValidateTokenResponse,
};

pub struct TokenValidationService {
    tokens: Arc<TokenService>,
}

impl TokenValidationService {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

fn invalid() -> ValidateTokenResponse {
    ValidateTokenResponse {
        valid: false,
        subject_id: String::new(),
        role: String::new(),
    }
}

#[tonic::async_trait]
impl TokenValidation for TokenValidationService {
    async fn validate_token(
        &self,
        request: Request<ValidateTokenRequest>,
    ) -> Result<Response<ValidateTokenResponse>, Status> {
        let req = request.into_inner();

        // An absent or empty token is a valid input that simply fails
        // verification; it short-circuits inside decode as malformed.
        match self.tokens.verify(&req.token, TokenType::Access).await {
            Ok(claims) => Ok(Response::new(ValidateTokenResponse {
                valid: true,
                subject_id: claims.sub.to_string(),
                role: claims.role.to_string(),
            })),
            Err(TokenError::StoreUnavailable(reason)) => {
                tracing::error!(%reason, "revocation store unavailable during validate_token");
                Err(Status::unavailable("revocation_store_unavailable"))
            }
            Err(TokenError::Signing(reason)) => Err(Status::internal(reason)),
            Err(rejection) => {
                // Same collapse as the HTTP edge: the caller only learns
                // that the token is not valid.
                debug!(kind = %rejection, "token rejected over grpc");
                Ok(Response::new(invalid()))
            }
        }
    }
}
