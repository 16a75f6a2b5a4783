//! Directive synthesis.
//!
//! Turns one joined [`HandlerDetail`] into swag directive lines, in this order:
//!
//! ```text
//! @Summary <summary>
//! @Accept application/json
//! @Produce application/json
//! @Success 200 {object} <responseType> "<success text>"
//! @Router <absolutePath> [<METHOD>]
//! @Param <name> <location> <payloadType> true "<param description>"
//! ```
//!
//! `@Success` is only emitted with a response and `@Router` only with a route; there is
//! one `@Param` per request binding.

use crate::config::AnalyzerConfig;
use crate::extractor::HandlerDetail;

pub const ACCEPT_DIRECTIVE: &str = "@Accept application/json";
pub const PRODUCE_DIRECTIVE: &str = "@Produce application/json";
pub const SUCCESS_STATUS: u16 = 200;

pub fn synthesize(detail: &HandlerDetail, config: &AnalyzerConfig) -> Vec<String> {
    let mut lines = Vec::with_capacity(5 + detail.requests.len());

    lines.push(if detail.summary.is_empty() {
        "@Summary".to_string()
    } else {
        format!("@Summary {}", detail.summary)
    });
    lines.push(ACCEPT_DIRECTIVE.to_string());
    lines.push(PRODUCE_DIRECTIVE.to_string());

    if let Some(response) = &detail.response {
        lines.push(format!(
            "@Success {} {{{}}} {} \"{}\"",
            SUCCESS_STATUS, response.display_kind, response.payload_type, config.success_text
        ));
    }

    if let Some(route) = &detail.route {
        lines.push(format!(
            "@Router {} [{}]",
            route.absolute_path, route.http_method
        ));
    }

    for request in &detail.requests {
        let name = request
            .variable_name
            .as_deref()
            .unwrap_or(&config.default_param_name);
        lines.push(format!(
            "@Param {} {} {} true \"{}\"",
            name,
            request.location.as_str(),
            request.payload_type,
            config.param_description
        ));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{
        BindingLocation, HandlerKey, HttpMethod, RequestBinding, ResponseBinding, RouteRecord,
        SourceLocation,
    };
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn detail() -> HandlerDetail {
        HandlerDetail {
            key: HandlerKey::method("accountApi", "GetAccountInfo"),
            summary: "GetAccountInfo 注册".to_string(),
            requests: vec![RequestBinding {
                payload_type: "request.GetAccountInfoReq".to_string(),
                location: BindingLocation::Body,
                variable_name: None,
            }],
            response: Some(ResponseBinding::object("response.AccountInfo".to_string())),
            route: Some(RouteRecord {
                absolute_path: "/account/getUserInfo".to_string(),
                http_method: HttpMethod::Get,
            }),
            location: SourceLocation {
                file: PathBuf::from("api/account/account.go"),
                line: 14,
                insert_offset: 0,
            },
            doc_lines: 1,
            has_router_directive: false,
        }
    }

    #[test]
    fn test_full_directive_set() {
        let lines = synthesize(&detail(), &AnalyzerConfig::default());

        assert_eq!(
            lines,
            vec![
                "@Summary GetAccountInfo 注册",
                "@Accept application/json",
                "@Produce application/json",
                "@Success 200 {object} response.AccountInfo \"成功\"",
                "@Router /account/getUserInfo [GET]",
                "@Param data body request.GetAccountInfoReq true \"请求参数\"",
            ]
        );
    }

    #[test]
    fn test_missing_route_and_response_are_omitted() {
        let mut detail = detail();
        detail.route = None;
        detail.response = None;
        detail.summary.clear();

        let lines = synthesize(&detail, &AnalyzerConfig::default());

        assert_eq!(
            lines,
            vec![
                "@Summary",
                "@Accept application/json",
                "@Produce application/json",
                "@Param data body request.GetAccountInfoReq true \"请求参数\"",
            ]
        );
    }

    #[test]
    fn test_params_in_binding_order() {
        let mut detail = detail();
        detail.requests.push(RequestBinding {
            payload_type: "string".to_string(),
            location: BindingLocation::Query,
            variable_name: Some("name".to_string()),
        });
        detail.requests.push(RequestBinding {
            payload_type: "request.Upload".to_string(),
            location: BindingLocation::Unknown,
            variable_name: None,
        });
        let config = AnalyzerConfig {
            default_param_name: "payload".to_string(),
            param_description: "params".to_string(),
            ..AnalyzerConfig::default()
        };

        let lines = synthesize(&detail, &config);
        let params: Vec<&String> = lines.iter().filter(|l| l.starts_with("@Param")).collect();

        assert_eq!(
            params,
            vec![
                "@Param payload body request.GetAccountInfoReq true \"params\"",
                "@Param name query string true \"params\"",
                "@Param payload  request.Upload true \"params\"",
            ]
        );
    }

    #[test]
    fn test_no_bindings_no_params() {
        let mut detail = detail();
        detail.requests.clear();

        let lines = synthesize(&detail, &AnalyzerConfig::default());

        assert!(lines.iter().all(|l| !l.starts_with("@Param")));
        assert!(lines.iter().all(|l| l.trim_end() == l));
    }
}
