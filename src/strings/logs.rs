//! Log lines for `tracing` and messages for the activity log.

pub const NO_BACKEND_HEALTHY: &str = "No healthy backend found";
pub const SHUTDOWN: &str = "Shutting down...";
pub const SMS_DISABLED: &str = "Twilio credentials incomplete - SMS responses disabled, summaries are only logged";

pub fn config_loaded(path: &str) -> String {
    format!("Loaded configuration from {path}")
}

pub fn listening(service: &str, addr: &str) -> String {
    format!("{service} listening on http://{addr}")
}

pub fn shutdown_fail(err: &str) -> String {
    format!("Unable to listen for shutdown signal: {err}")
}

pub fn probe_unhealthy(backend: &str, reason: &str) -> String {
    format!("Backend [{backend}] unhealthy: {reason}")
}

pub fn backend_selected(backend: &str, address: &str) -> String {
    format!("Selected backend [{backend}] at {address}")
}

pub fn dispatch_failed(backend: &str, kind: &str, detail: &str) -> String {
    format!("Dispatch to [{backend}] failed ({kind}): {detail}")
}

pub fn window_located(title: &str) -> String {
    format!("Automation target located: {title}")
}

pub fn automation_completed(chars: usize) -> String {
    format!("Automation completed, collected {chars} chars")
}

pub fn automation_failed(step: &str, err: &str) -> String {
    format!("Automation aborted at {step}: {err}")
}

pub fn reply_not_ready(polls: u32) -> String {
    format!("Target not ready after {polls} polls, collecting anyway")
}

pub fn collect_step_failed(step: &str, err: &str) -> String {
    format!("Response collection degraded at {step}: {err}")
}

pub fn clipboard_implausible(chars: usize) -> String {
    format!("Clipboard holds {chars} chars, below plausibility threshold")
}

pub fn inbound_command(sender: &str, body: &str) -> String {
    format!("Inbound command from {sender}: {body}")
}

pub fn classified(kind: &str, description: &str) -> String {
    format!("Classified as {kind}: {description}")
}

pub fn command_failed(sender: &str, detail: &str) -> String {
    format!("Command from {sender} failed: {detail}")
}

pub fn command_rejected(sender: &str, reason: &str) -> String {
    format!("Rejected command from {sender}: {reason}")
}

pub fn classifier_ready(provider: &str, model: &str) -> String {
    format!("Classifier: {provider} / {model}")
}

pub fn backend_configured(name: &str, address: &str, priority: u32) -> String {
    format!("Backend [{name}] at {address} (priority {priority})")
}

pub fn driver_selected(driver: &str) -> String {
    format!("Automation driver: {driver}")
}

pub fn summary_sent(recipient: &str) -> String {
    format!("Summary sent to {recipient}")
}

pub fn classifier_failed(err: &str) -> String {
    format!("Classifier unavailable: {err}")
}

pub fn notify_failed(recipient: &str, err: &str) -> String {
    format!("Failed to deliver summary to {recipient}: {err}")
}

pub fn summary_logged(recipient: &str, summary: &str) -> String {
    format!("Summary for {recipient}:\n{summary}")
}

pub fn pipeline_panicked(err: &str) -> String {
    format!("Pipeline task failed: {err}")
}

// Activity log messages

pub fn activity_inbound(body: &str) -> String {
    format!("Received: {body}")
}

pub fn activity_dispatched(kind: &str, backend: &str) -> String {
    format!("Dispatched {kind} to {backend}")
}

pub fn activity_outcome(description: &str) -> String {
    format!("Completed: {description}")
}

pub fn activity_error(detail: &str) -> String {
    format!("Failed: {detail}")
}
