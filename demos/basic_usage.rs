use app_errors::{translate, AppError, RequestContext, RetryAfter};
use serde_json::json;

fn create_account(body: &serde_json::Value) -> Result<(), serde_json::Value> {
    // Simulate the schema validator rejecting a body without an email
    if body.get("email").is_none() {
        return Err(json!({
            "output": { "payload": {
                "message": "child \"email\" fails because [\"email\" is required]",
                "validation": { "keys": ["email"] }
            } }
        }));
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("--- Basic Usage Example ---\n");

    let ctx = RequestContext::new().with_method("POST").with_path("/v1/account/create");

    match create_account(&json!({ "authPW": "..." })) {
        Ok(()) => println!("Success!"),
        Err(failure) => {
            let err = translate(failure, Some(&ctx));

            // SCENARIO 1: what the client receives
            println!("1. [RESPONSE] status {}", err.http_status());
            println!("   {}", serde_json::to_string_pretty(&err).unwrap_or_default());

            // SCENARIO 2: what operators see
            println!("\n2. [INTERNAL LOG]");
            err.with_internal_log(|log| {
                let mut line = String::new();
                let _ = log.write_to(&mut line);
                println!("   {line}");
            });
        }
    }

    // A backend connection dropped mid-request
    let err = translate(json!({ "reason": "socket hang up" }), Some(&ctx));
    println!("\n3. [BACKEND FAILURE] {err}");
    err.internal_log().emit();

    // Throttled client
    let err = AppError::too_many_requests(RetryAfter::seconds(900).localized("in 15 minutes"));
    if let Ok(response) = err.to_response() {
        println!("\n4. [THROTTLED] {} retry-after={:?}", response.status(), response.headers().get("retry-after"));
        println!("   {}", response.body());
    }
}
