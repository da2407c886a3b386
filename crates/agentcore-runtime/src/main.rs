//! Demo binary hosting an echo handler behind the runtime's HTTP contract.
//!
//! `{"prompt": "..."}` is answered with text; adding `"stream": true` replies
//! with one server-sent event per word instead.

use std::process::ExitCode;

use agentcore_runtime::{
    Handler, HandlerError, InvocationContext, Reply, RuntimeServices, agent_invocation,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PromptRequest {
    prompt: String,
    #[serde(default)]
    stream: bool,
}

fn build_echo(_services: &RuntimeServices) -> Handler {
    Handler::with_request_and_context(|request: PromptRequest, context: InvocationContext| async move {
        if request.prompt.trim().is_empty() {
            return Err(HandlerError::bad_request("prompt must not be empty"));
        }
        let session = context.session_id().unwrap_or("anonymous").to_owned();
        if request.stream {
            let words: Vec<Result<String, HandlerError>> = request
                .prompt
                .split_whitespace()
                .map(|word| Ok(word.to_owned()))
                .collect();
            return Ok(Reply::stream(futures::stream::iter(words)));
        }
        Ok(Reply::text(format!("[{session}] You said: {}", request.prompt)))
    })
}

agent_invocation!(echo, build_echo);

#[tokio::main]
async fn main() -> ExitCode {
    let runtime = match agentcore_runtime::bootstrap(None) {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("agentcore-runtime: {error}");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %error, "failed to listen for shutdown signal");
        }
    };

    match runtime.serve(shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "runtime stopped with an error");
            ExitCode::FAILURE
        }
    }
}
