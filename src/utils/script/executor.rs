use crate::{models::MonitorMatch, utils::script::error::ScriptError};
use async_trait::async_trait;
use std::{collections::HashMap, process::Stdio, time::Duration};
use tokio::{io::AsyncWriteExt, time::timeout};

/// A trait that defines the interface for executing scripts in different languages.
///
/// Scripts receive `{"monitor_match": ..., "args": [...]}` on standard input.
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
	/// Executes the script with the given match as input.
	///
	/// # Arguments
	/// * `input` - The match the script is asked about
	/// * `timeout_ms` - Wall-clock limit for the process
	/// * `args` - Additional arguments passed through in the JSON payload
	/// * `from_custom_notification` - Notification scripts only report success; their
	///   standard output is not parsed
	///
	/// # Returns
	/// * `Result<bool, ScriptError>` - The verdict (always true for notifications) or an error
	async fn execute(
		&self,
		input: &MonitorMatch,
		timeout_ms: &u32,
		args: Option<&[String]>,
		from_custom_notification: bool,
	) -> Result<bool, ScriptError>;
}

/// Counts open file descriptors of this process against the soft `RLIMIT_NOFILE`
#[cfg(unix)]
fn count_open_fds() -> (usize, u64) {
	use libc::{c_int, getrlimit, rlimit, RLIMIT_NOFILE};
	use std::mem::MaybeUninit;

	let mut limit = MaybeUninit::<rlimit>::uninit();
	// SAFETY: getrlimit only writes into the provided struct
	let ret = unsafe { getrlimit(RLIMIT_NOFILE, limit.as_mut_ptr()) };
	if ret != 0 {
		tracing::debug!("Failed to get rlimit");
		return (0, 0);
	}

	// SAFETY: initialised by the successful call above
	let limit = unsafe { limit.assume_init() };
	// Probing past a few thousand descriptors is not worth the syscalls
	let probe_limit = limit.rlim_cur.min(65_536);
	let count = (0..probe_limit)
		// SAFETY: F_GETFD on an arbitrary descriptor has no side effects
		.filter(|fd| unsafe { libc::fcntl(*fd as c_int, libc::F_GETFD) } != -1)
		.count();

	(count, limit.rlim_cur as u64)
}

#[cfg(not(unix))]
fn count_open_fds() -> (usize, u64) {
	(0, 0)
}

fn warn_on_fd_pressure() {
	let (open_fds, max_fds) = count_open_fds();
	if max_fds > 0 && (open_fds as u64).saturating_mul(10) >= max_fds.saturating_mul(9) {
		tracing::warn!(
			open_fds,
			max_fds,
			"Open file descriptors are close to the limit; raise it with `ulimit -n <number>`"
		);
	}
}

/// Spawns `program flag content`, feeds the JSON payload on stdin and waits for exit
async fn run_script(
	program: &str,
	flag: &str,
	script_content: &str,
	input: &MonitorMatch,
	timeout_ms: &u32,
	args: Option<&[String]>,
	from_custom_notification: bool,
) -> Result<bool, ScriptError> {
	let combined_input = serde_json::json!({
		"monitor_match": input,
		"args": args
	});
	let input_json = serde_json::to_string(&combined_input).map_err(|e| {
		ScriptError::parse_error(
			format!("Failed to serialize script input: {}", e),
			Some(Box::new(e)),
			None,
		)
	})?;

	warn_on_fd_pressure();

	let mut child = tokio::process::Command::new(program)
		.arg(flag)
		.arg(script_content)
		.stdin(Stdio::piped())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.kill_on_drop(true)
		.spawn()
		.map_err(|e| {
			ScriptError::system_error(
				format!("Failed to spawn {}: {}", program, e),
				Some(Box::new(e)),
				None,
			)
		})?;

	let Some(mut stdin) = child.stdin.take() else {
		return Err(ScriptError::system_error(
			"Failed to get stdin handle",
			None,
			None,
		));
	};

	// Input is written while output is collected; both count against the timeout
	let feed = async move {
		let written = stdin.write_all(input_json.as_bytes()).await;
		drop(stdin);
		match written {
			// A script that never reads its input may already have exited
			Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => Err(e),
			_ => Ok(()),
		}
	};
	let run = async {
		let (written, output) = tokio::join!(feed, child.wait_with_output());
		written.map_err(|e| {
			ScriptError::system_error(
				format!("Failed to write script input: {}", e),
				Some(Box::new(e)),
				None,
			)
		})?;
		output.map_err(|e| {
			ScriptError::system_error(
				format!("Failed to wait for script: {}", e),
				Some(Box::new(e)),
				None,
			)
		})
	};

	let timeout_duration = Duration::from_millis(u64::from(*timeout_ms));
	match timeout(timeout_duration, run).await {
		Ok(output) => process_script_output(output?, from_custom_notification),
		Err(_) => Err(ScriptError::timeout(
			format!("Script execution timed out after {}ms", timeout_ms),
			None,
			None,
		)),
	}
}

/// Executes Python scripts using the python3 interpreter.
pub struct PythonScriptExecutor {
	/// Content of the Python script file to be executed
	pub script_content: String,
}

#[async_trait]
impl ScriptExecutor for PythonScriptExecutor {
	async fn execute(
		&self,
		input: &MonitorMatch,
		timeout_ms: &u32,
		args: Option<&[String]>,
		from_custom_notification: bool,
	) -> Result<bool, ScriptError> {
		run_script(
			"python3",
			"-c",
			&self.script_content,
			input,
			timeout_ms,
			args,
			from_custom_notification,
		)
		.await
	}
}

/// Executes JavaScript scripts using the Node.js runtime.
pub struct JavaScriptScriptExecutor {
	/// Content of the JavaScript script file to be executed
	pub script_content: String,
}

#[async_trait]
impl ScriptExecutor for JavaScriptScriptExecutor {
	async fn execute(
		&self,
		input: &MonitorMatch,
		timeout_ms: &u32,
		args: Option<&[String]>,
		from_custom_notification: bool,
	) -> Result<bool, ScriptError> {
		run_script(
			"node",
			"-e",
			&self.script_content,
			input,
			timeout_ms,
			args,
			from_custom_notification,
		)
		.await
	}
}

/// Executes shell scripts with `sh`.
pub struct BashScriptExecutor {
	/// Content of the shell script file to be executed
	pub script_content: String,
}

#[async_trait]
impl ScriptExecutor for BashScriptExecutor {
	async fn execute(
		&self,
		input: &MonitorMatch,
		timeout_ms: &u32,
		args: Option<&[String]>,
		from_custom_notification: bool,
	) -> Result<bool, ScriptError> {
		run_script(
			"sh",
			"-c",
			&self.script_content,
			input,
			timeout_ms,
			args,
			from_custom_notification,
		)
		.await
	}
}

/// Processes the output of a finished script.
///
/// A non-zero exit is an error carrying the exit code and captured standard error.
/// Notification scripts stop there. Filter scripts must end their standard output with
/// a line reading exactly `true` or `false`; earlier lines are informational.
pub fn process_script_output(
	output: std::process::Output,
	from_custom_notification: bool,
) -> Result<bool, ScriptError> {
	if !output.status.success() {
		let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
		let exit_code = output
			.status
			.code()
			.map(|c| c.to_string())
			.unwrap_or_else(|| "signal".to_string());

		return Err(ScriptError::execution_error(
			format!("Script exited with status {}", exit_code),
			None,
			Some(HashMap::from([
				("exit_code".to_string(), exit_code),
				("stderr".to_string(), stderr),
			])),
		));
	}

	if from_custom_notification {
		return Ok(true);
	}

	let stdout = String::from_utf8_lossy(&output.stdout);
	let last_line = stdout
		.lines()
		.map(str::trim)
		.rev()
		.find(|line| !line.is_empty())
		.ok_or_else(|| ScriptError::parse_error("Script produced no output", None, None))?;

	match last_line {
		"true" => Ok(true),
		"false" => Ok(false),
		other => Err(ScriptError::parse_error(
			"Last line of output is not a valid boolean",
			None,
			Some(HashMap::from([("last_line".to_string(), other.to_string())])),
		)),
	}
}
