//! AWS Lambda handler for the IRR calculator
//!
//! Accepts the calculator form as JSON and returns the calculation outcome.
//! Works both for direct invocation (the payload is the form) and for Lambda
//! Function URLs / API Gateway proxies (the form is the request body).
//!
//! Solver settings come from IRR_INITIAL_GUESS, IRR_TOLERANCE and IRR_MAX_ITERATIONS.

use irr_calculator::{CalculationOutcome, IrrCalculator, IrrInputs, SolverConfig};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::warn;
use serde::Serialize;
use serde_json::{json, Value};

/// How the function was invoked
#[derive(Debug, PartialEq)]
enum Invocation {
    /// Payload is the form itself
    Direct(Value),
    /// HTTP event with the form in the body
    Http {
        method: String,
        body: Option<String>,
        is_base64_encoded: bool,
    },
}

impl Invocation {
    fn from_payload(payload: Value) -> Self {
        if payload.get("requestContext").is_none() {
            return Invocation::Direct(payload);
        }

        // Function URLs / HTTP API v2 carry requestContext.http.method, REST APIs httpMethod
        let method = payload
            .pointer("/requestContext/http/method")
            .or_else(|| payload.get("httpMethod"))
            .and_then(Value::as_str)
            .unwrap_or("POST")
            .to_uppercase();

        Invocation::Http {
            method,
            body: payload.get("body").and_then(Value::as_str).map(str::to_string),
            is_base64_encoded: payload
                .get("isBase64Encoded")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

fn to_body<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| json!({ "error": format!("Serialization failed: {}", e) }).to_string())
}

fn http_response(status: u16, body: Option<String>) -> Value {
    json!({
        "statusCode": status,
        "headers": {
            "Content-Type": "application/json",
            "Access-Control-Allow-Origin": "*",
            "Access-Control-Allow-Methods": "POST, OPTIONS",
            "Access-Control-Allow-Headers": "Content-Type",
        },
        "body": body.unwrap_or_default(),
        "isBase64Encoded": false,
    })
}

fn error_response(status: u16, message: &str) -> Value {
    http_response(status, Some(json!({ "error": message }).to_string()))
}

fn status_for(outcome: &CalculationOutcome) -> u16 {
    match outcome {
        CalculationOutcome::InvalidInput { .. } => 422,
        _ => 200,
    }
}

fn respond(payload: Value, calculator: &IrrCalculator) -> Value {
    match Invocation::from_payload(payload) {
        Invocation::Direct(form) => {
            // An empty invocation means "use the defaults"
            let form = if form.is_null() { json!({}) } else { form };
            match serde_json::from_value::<IrrInputs>(form) {
                Ok(inputs) => {
                    let outcome = calculator.calculate(&inputs);
                    serde_json::to_value(&outcome)
                        .unwrap_or_else(|e| json!({ "status": "error", "error": e.to_string() }))
                }
                Err(e) => {
                    warn!("Invalid request payload: {}", e);
                    json!({ "status": "error", "error": format!("Invalid JSON: {}", e) })
                }
            }
        }
        Invocation::Http { method, body, is_base64_encoded } => {
            if method == "OPTIONS" {
                return http_response(200, None);
            }
            if is_base64_encoded {
                return error_response(400, "Base64-encoded bodies are not supported");
            }

            let body = body
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| "{}".to_string());

            let inputs: IrrInputs = match serde_json::from_str(&body) {
                Ok(r) => r,
                Err(e) => {
                    warn!("Invalid request body: {}", e);
                    return error_response(400, &format!("Invalid JSON: {}", e));
                }
            };

            let outcome = calculator.calculate(&inputs);
            http_response(status_for(&outcome), Some(to_body(&outcome)))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let calculator = IrrCalculator::new(SolverConfig::from_env());

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        Ok::<Value, Error>(respond(event.payload, &calculator))
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_event(method: &str, body: Option<&str>) -> Value {
        json!({
            "version": "2.0",
            "rawPath": "/",
            "requestContext": { "http": { "method": method } },
            "body": body,
            "isBase64Encoded": false,
        })
    }

    fn body_json(response: &Value) -> Value {
        serde_json::from_str(response["body"].as_str().unwrap()).unwrap()
    }

    #[test]
    fn test_direct_invocation() {
        let payload = json!({
            "annual_deposit": -1000.0,
            "deposit_years": 1,
            "final_amount": 1100.0,
            "total_years": 1
        });

        let response = respond(payload, &IrrCalculator::default());
        assert_eq!(response["status"], "success");
        assert_eq!(response["headline"], "IRR = 0.1000 or 10.00%");
        assert_eq!(response["cash_flows"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_direct_invocation_defaults() {
        let response = respond(Value::Null, &IrrCalculator::default());
        assert_eq!(response["status"], "success");
        assert_eq!(response["cash_flows"].as_array().unwrap().len(), 47);
    }

    #[test]
    fn test_function_url_post() {
        let event = url_event("POST", Some(r#"{"annual_deposit": -1000, "deposit_years": 1, "final_amount": 1100, "total_years": 1}"#));
        let response = respond(event, &IrrCalculator::default());

        assert_eq!(response["statusCode"], 200);
        assert_eq!(response["headers"]["Access-Control-Allow-Origin"], "*");
        assert_eq!(body_json(&response)["rate_pct"], "10.00%");
    }

    #[test]
    fn test_function_url_preflight() {
        let response = respond(url_event("options", None), &IrrCalculator::default());
        assert_eq!(response["statusCode"], 200);
        assert_eq!(response["body"], "");
    }

    #[test]
    fn test_function_url_bad_json() {
        let response = respond(url_event("POST", Some("{not json")), &IrrCalculator::default());
        assert_eq!(response["statusCode"], 400);
        assert!(body_json(&response)["error"].as_str().unwrap().starts_with("Invalid JSON"));
    }

    #[test]
    fn test_function_url_invalid_inputs() {
        let event = url_event("POST", Some(r#"{"deposit_years": 50, "total_years": 10}"#));
        let response = respond(event, &IrrCalculator::default());
        assert_eq!(response["statusCode"], 422);
        assert_eq!(body_json(&response)["status"], "invalid_input");
    }

    #[test]
    fn test_function_url_convergence_failure() {
        let event = url_event("POST", Some(r#"{"final_amount": -5}"#));
        let response = respond(event, &IrrCalculator::default());
        let body = body_json(&response);

        assert_eq!(response["statusCode"], 200);
        assert_eq!(body["status"], "failure");
        assert_eq!(body["message"], "Failed to converge. Try adjusting the inputs.");
        assert!(body.get("cash_flows").is_none());
    }

    #[test]
    fn test_rest_api_method_detection() {
        let event = json!({
            "httpMethod": "OPTIONS",
            "requestContext": {},
            "body": null,
        });
        assert_eq!(
            Invocation::from_payload(event),
            Invocation::Http { method: "OPTIONS".into(), body: None, is_base64_encoded: false }
        );
    }
}
