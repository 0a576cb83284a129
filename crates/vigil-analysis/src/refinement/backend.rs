//! Generation backend contract.

use vigil_core::errors::BackendError;

/// An external code generator, typically an LLM completion call.
///
/// One synchronous request/response. Failures are hard errors: the
/// orchestrator never retries them.
pub trait GenerationBackend: Send + Sync {
    fn generate(&self, prompt: &str, system_context: &str) -> Result<String, BackendError>;
}

impl<F> GenerationBackend for F
where
    F: Fn(&str, &str) -> Result<String, BackendError> + Send + Sync,
{
    fn generate(&self, prompt: &str, system_context: &str) -> Result<String, BackendError> {
        self(prompt, system_context)
    }
}

/// Extract the code from a backend reply.
///
/// Takes the body of the first fenced block when the reply has one,
/// otherwise the whole reply. An empty result is an error, not a candidate.
pub fn extract_code(reply: &str) -> Result<String, BackendError> {
    let code = match fenced_body(reply) {
        Some(body) => body,
        None => reply.trim(),
    };
    if code.trim().is_empty() {
        return Err(BackendError::EmptyResponse);
    }
    Ok(code.to_string())
}

fn fenced_body(reply: &str) -> Option<&str> {
    let open = reply.find("```")?;
    let after_fence = &reply[open + 3..];
    // Skip the info string (```ts).
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```").unwrap_or(body.len());
    Some(body[..end].trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fence_and_info_string() {
        let reply = "Here you go:\n```ts\nconst a = 1;\n```\nThanks";
        assert_eq!(extract_code(reply).unwrap(), "const a = 1;");
    }

    #[test]
    fn unfenced_reply_is_trimmed() {
        assert_eq!(extract_code("\n  let x = 2;\n").unwrap(), "let x = 2;");
    }

    #[test]
    fn unterminated_fence_takes_the_rest() {
        assert_eq!(extract_code("```\nfn a() {}\n").unwrap(), "fn a() {}");
    }

    #[test]
    fn empty_reply_is_an_error() {
        assert_eq!(extract_code("   "), Err(BackendError::EmptyResponse));
        assert_eq!(extract_code("```js\n```"), Err(BackendError::EmptyResponse));
    }
}
