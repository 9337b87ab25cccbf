//! Facade service: serves the browser client and proxies queries.

use crate::http::{Handler, HttpRequest, HttpResponse};
use crate::proxy::Forwarder;
use crate::service::backend::COMMAND_PARAM;

/// Path of the browser client page.
pub const CLIENT_PATH: &str = "/cliente";

/// Path proxied to the backend.
pub const QUERY_PATH: &str = "/consulta";

/// Browser client: one input, one button, one output area.
pub const CLIENT_PAGE: &str = include_str!("../../assets/cliente.html");

/// Routes facade requests to the page or the backend.
#[derive(Debug, Clone)]
pub struct FacadeService {
    forwarder: Forwarder,
}

impl FacadeService {
    pub fn new(forwarder: Forwarder) -> Self {
        Self { forwarder }
    }
}

impl Handler for FacadeService {
    fn name(&self) -> &'static str {
        "facade"
    }

    async fn handle(&self, request: HttpRequest) -> HttpResponse {
        match request.path() {
            CLIENT_PATH => HttpResponse::ok_html(CLIENT_PAGE),
            QUERY_PATH => {
                let command = match request.query_param(COMMAND_PARAM) {
                    Some(command) if !command.is_empty() => command,
                    _ => return HttpResponse::bad_request("Missing 'comando'"),
                };
                match self.forwarder.forward(command).await {
                    Ok(body) => HttpResponse::ok_json(body),
                    Err(e) => {
                        tracing::warn!(
                            upstream = %self.forwarder.authority(),
                            error = %e,
                            "Backend request failed"
                        );
                        HttpResponse::server_error(&e.to_string())
                    }
                }
            }
            _ => HttpResponse::not_found("Use /cliente or /consulta"),
        }
    }
}
