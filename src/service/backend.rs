//! Backend service: executes commands received on `/compreflex`.

use crate::engine::Engine;
use crate::http::{Handler, HttpRequest, HttpResponse};

/// Path the backend answers on.
pub const EXECUTE_PATH: &str = "/compreflex";

/// Query parameter carrying the command.
pub const COMMAND_PARAM: &str = "comando";

/// Routes backend requests to the execution engine.
#[derive(Debug, Clone)]
pub struct BackendService {
    engine: Engine,
}

impl BackendService {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}

impl Handler for BackendService {
    fn name(&self) -> &'static str {
        "backend"
    }

    async fn handle(&self, request: HttpRequest) -> HttpResponse {
        if request.path() != EXECUTE_PATH {
            return HttpResponse::not_found("Use /compreflex");
        }

        let command = match request.query_param(COMMAND_PARAM) {
            Some(command) if !command.is_empty() => command.to_string(),
            _ => return HttpResponse::bad_request("Missing 'comando'"),
        };

        // Catalog functions are synchronous and may be CPU bound.
        let engine = self.engine.clone();
        let result = tokio::task::spawn_blocking(move || {
            let result = engine.run(&command);
            tracing::debug!(command = %command, success = result.is_success(), "Command executed");
            result.to_json()
        })
        .await;

        match result {
            Ok(json) => HttpResponse::ok_json(json),
            Err(e) => {
                tracing::error!(error = %e, "Engine task failed");
                HttpResponse::server_error(&e.to_string())
            }
        }
    }
}
