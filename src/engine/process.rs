//! # 子进程引擎桥接
//!
//! 通过一个包装了商业引擎 API 的桥接程序调用外部引擎。
//!
//! ## 协议
//! - 会话开始时启动桥接程序，发送一行 `open` 消息（数据库和元素）
//! - 每个成分点发送一行 `calculate` 请求，读取一行响应：
//!   `{"status":"ok","result":{...}}` 或
//!   `{"status":"error","kind":"convergence","message":"..."}`
//! - 关闭 stdin 即结束会话，随后回收子进程
//!
//! ## 依赖关系
//! - 实现 `engine/mod.rs` 的 `Engine` / `EngineSession`
//! - 使用 `serde_json` 编解码消息

use super::{CalculationRequest, Engine, EngineError, EngineSession};
use crate::models::{PhaseDiagramResult, PhaseGroup};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 关闭会话时等待子进程退出的时长
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// 发往桥接程序的消息
#[derive(Serialize)]
#[serde(tag = "command", rename_all = "lowercase")]
enum BridgeMessage<'a> {
    Open {
        database: &'a str,
        elements: &'a [String],
    },
    Calculate(&'a CalculationRequest),
}

/// 桥接程序返回的错误种类
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum BridgeErrorKind {
    InvalidComposition,
    License,
    Session,
    Convergence,
    Timeout,
    #[serde(other)]
    Other,
}

/// 桥接程序返回的相图数据（松散结构，在此处收窄为 PhaseDiagramResult）
#[derive(Deserialize, Debug)]
struct BridgeResult {
    #[serde(default)]
    x_quantity: String,
    #[serde(default)]
    y_quantity: String,
    #[serde(default)]
    groups: BTreeMap<String, BridgeGroup>,
}

/// 单个相组合的坐标序列；缺失的序列按空处理
#[derive(Deserialize, Debug)]
struct BridgeGroup {
    #[serde(default)]
    x: Vec<f64>,
    #[serde(default)]
    y: Vec<f64>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "status", rename_all = "lowercase")]
enum BridgeResponse {
    Ok {
        #[serde(default)]
        result: Option<BridgeResult>,
    },
    Error {
        kind: BridgeErrorKind,
        #[serde(default)]
        message: String,
    },
}

impl From<BridgeResult> for PhaseDiagramResult {
    fn from(raw: BridgeResult) -> Self {
        raw.groups.into_iter().fold(
            PhaseDiagramResult::new(raw.x_quantity, raw.y_quantity),
            |result, (phases, group)| {
                result.with_group(phases, PhaseGroup::new(group.x, group.y))
            },
        )
    }
}

fn into_engine_error(kind: BridgeErrorKind, message: String) -> EngineError {
    match kind {
        BridgeErrorKind::InvalidComposition => EngineError::InvalidComposition(message),
        BridgeErrorKind::License | BridgeErrorKind::Session => EngineError::Session(message),
        BridgeErrorKind::Convergence => EngineError::Convergence(message),
        BridgeErrorKind::Timeout => EngineError::Timeout(message),
        BridgeErrorKind::Other => EngineError::Protocol(message),
    }
}

/// 子进程引擎
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    command: String,
    args: Vec<String>,
}

impl ProcessEngine {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        ProcessEngine {
            command: command.into(),
            args,
        }
    }
}

impl Engine for ProcessEngine {
    type Session = ProcessSession;

    fn open(&self, database: &str, elements: &[String]) -> Result<ProcessSession, EngineError> {
        info!(command = %self.command, database, "starting engine bridge");

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| EngineError::Spawn {
                command: self.command.clone(),
                reason: e.to_string(),
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().map(BufReader::new);

        let (stdin, stdout) = match (stdin, stdout) {
            (Some(i), Some(o)) => (i, o),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(EngineError::Session(
                    "engine bridge pipes are unavailable".to_string(),
                ));
            }
        };

        // 先构造会话，握手失败时由 Drop 回收子进程
        let mut session = ProcessSession {
            child,
            stdin: Some(stdin),
            stdout,
            calls: 0,
        };

        match session.exchange(&BridgeMessage::Open { database, elements })? {
            BridgeResponse::Ok { .. } => {
                debug!(elements = elements.len(), "engine session opened");
                Ok(session)
            }
            BridgeResponse::Error { kind, message } => Err(into_engine_error(kind, message)),
        }
    }
}

/// 子进程引擎会话；Drop 时关闭 stdin 并回收子进程
pub struct ProcessSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    calls: usize,
}

impl ProcessSession {
    /// 发送一行消息并读取一行响应
    fn exchange(&mut self, message: &BridgeMessage<'_>) -> Result<BridgeResponse, EngineError> {
        let line = serde_json::to_string(message)
            .map_err(|e| EngineError::Protocol(format!("cannot encode request: {}", e)))?;

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| EngineError::Session("engine session is closed".to_string()))?;
        writeln!(stdin, "{}", line)
            .and_then(|_| stdin.flush())
            .map_err(|e| EngineError::Session(format!("engine bridge is gone: {}", e)))?;

        let mut buf = String::new();
        loop {
            buf.clear();
            let n = self
                .stdout
                .read_line(&mut buf)
                .map_err(|e| EngineError::Session(format!("cannot read from engine bridge: {}", e)))?;
            if n == 0 {
                return Err(EngineError::Session(
                    "engine bridge exited unexpectedly".to_string(),
                ));
            }
            if !buf.trim().is_empty() {
                break;
            }
        }

        serde_json::from_str(buf.trim())
            .map_err(|e| EngineError::Protocol(format!("malformed response: {}", e)))
    }

    fn shutdown(&mut self) {
        debug!(calls = self.calls, "closing engine bridge session");
        // 关闭 stdin 通知桥接程序退出
        drop(self.stdin.take());

        let deadline = Instant::now() + SHUTDOWN_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    debug!(%status, "engine bridge exited");
                    return;
                }
                Ok(None) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(20));
                }
                Ok(None) => {
                    warn!("engine bridge did not exit in time, killing it");
                    let _ = self.child.kill();
                    let _ = self.child.wait();
                    return;
                }
                Err(e) => {
                    warn!("failed to wait for engine bridge: {}", e);
                    return;
                }
            }
        }
    }
}

impl EngineSession for ProcessSession {
    fn calculate(&mut self, request: &CalculationRequest) -> Result<PhaseDiagramResult, EngineError> {
        debug!(point = %request.name, "sending calculation request");
        self.calls += 1;

        match self.exchange(&BridgeMessage::Calculate(request))? {
            BridgeResponse::Ok { result: Some(raw) } => Ok(raw.into()),
            BridgeResponse::Ok { result: None } => Err(EngineError::Protocol(format!(
                "response for {} carries no result",
                request.name
            ))),
            BridgeResponse::Error { kind, message } => Err(into_engine_error(kind, message)),
        }
    }
}

impl Drop for ProcessSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CalculationSettings, TemperatureAxis};
    use crate::models::CompositionPoint;

    #[test]
    fn test_response_parsing() {
        let ok: BridgeResponse = serde_json::from_str(
            r#"{"status":"ok","result":{"x_quantity":"X(Cr)","y_quantity":"T","groups":{"FCC_A1":{"x":[0.1],"y":[800.0]}}}}"#,
        )
        .unwrap();
        match ok {
            BridgeResponse::Ok { result: Some(raw) } => {
                let result: PhaseDiagramResult = raw.into();
                assert_eq!(result.x_quantity(), "X(Cr)");
                assert_eq!(result.group("FCC_A1").unwrap().len(), 1);
            }
            other => panic!("unexpected response: {:?}", other),
        }

        let err: BridgeResponse = serde_json::from_str(
            r#"{"status":"error","kind":"license","message":"no seats"}"#,
        )
        .unwrap();
        match err {
            BridgeResponse::Error { kind, message } => {
                assert_eq!(
                    into_engine_error(kind, message),
                    EngineError::Session("no seats".to_string())
                );
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_group_with_missing_series_is_kept_empty() {
        let raw: BridgeResult = serde_json::from_str(
            r#"{"x_quantity":"X(Al)","y_quantity":"T","groups":{"LIQUID":{"x":[0.1,0.2]}}}"#,
        )
        .unwrap();
        let result: PhaseDiagramResult = raw.into();

        let group = result.group("LIQUID").unwrap();
        assert_eq!(group.x, vec![0.1, 0.2]);
        assert!(group.y.is_empty());
        assert!(group.is_empty());
    }

    #[test]
    fn test_unknown_error_kind_is_protocol_error() {
        let err: BridgeResponse =
            serde_json::from_str(r#"{"status":"error","kind":"segfault","message":"boom"}"#).unwrap();
        match err {
            BridgeResponse::Error { kind, message } => {
                assert!(matches!(
                    into_engine_error(kind, message),
                    EngineError::Protocol(_)
                ));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_open_message_shape() {
        let elements = vec!["Al".to_string(), "Ni".to_string()];
        let line = serde_json::to_string(&BridgeMessage::Open {
            database: "TCHEA6",
            elements: &elements,
        })
        .unwrap();
        assert_eq!(
            line,
            r#"{"command":"open","database":"TCHEA6","elements":["Al","Ni"]}"#
        );
    }

    #[test]
    fn test_missing_command_is_spawn_error() {
        let engine = ProcessEngine::new("phasesweep-no-such-bridge", vec![]);
        let err = engine.open("TCHEA6", &["Al".to_string()]).err().unwrap();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_bridge_session() {
        let script = r#"
while IFS= read -r line; do
  case "$line" in
    *'"command":"open"'*) echo '{"status":"ok"}' ;;
    *'"name":"Al0.10-Ni0.90"'*) echo '{"status":"error","kind":"convergence","message":"no solution"}' ;;
    *) echo '{"status":"ok","result":{"x_quantity":"X(Al)","y_quantity":"T","groups":{"FCC_L12":{"x":[0.0,0.1],"y":[500.0,600.0]}}}}' ;;
  esac
done
"#;
        let engine = ProcessEngine::new("sh", vec!["-c".to_string(), script.to_string()]);
        let mut session = engine
            .open("TCHEA6", &["Al".to_string(), "Ni".to_string()])
            .unwrap();

        let settings = CalculationSettings {
            database: "TCHEA6".to_string(),
            temperature: TemperatureAxis {
                min: 500.0,
                max: 1200.0,
                steps: 60,
            },
            global_minimization: true,
            timeout_minutes: 15,
            axis_element: None,
            budget_element: None,
        };

        let good = CompositionPoint::new(
            vec![("Al".to_string(), 0.05), ("Ni".to_string(), 0.95)],
            2,
        );
        let result = session
            .calculate(&CalculationRequest::for_point(&good, &settings))
            .unwrap();
        assert_eq!(result.group("FCC_L12").unwrap().len(), 2);

        let bad = CompositionPoint::new(
            vec![("Al".to_string(), 0.10), ("Ni".to_string(), 0.90)],
            2,
        );
        let err = session
            .calculate(&CalculationRequest::for_point(&bad, &settings))
            .unwrap_err();
        assert_eq!(err, EngineError::Convergence("no solution".to_string()));
        assert_eq!(session.calls, 2);
    }
}
