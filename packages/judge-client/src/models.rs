use serde::{Deserialize, Deserializer, Serialize};

/// One evaluation request sent to the judge: a program, the language to run
/// it under, the stdin to feed it, and the output it is expected to produce.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRequest<'a> {
    pub source_code: &'a str,
    pub language_id: i32,
    pub stdin: &'a str,
    pub expected_output: &'a str,
}

/// The judge's verdict for a single evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Verdict string as reported by the judge (e.g. "Accepted",
    /// "Wrong Answer", "Runtime Error (NZEC)").
    pub verdict: String,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    /// Wall-clock time in seconds.
    pub time: Option<f64>,
    /// Peak memory in kilobytes.
    pub memory: Option<f64>,
}

impl Evaluation {
    pub fn is_accepted(&self) -> bool {
        self.verdict == "Accepted"
    }
}

/// Wire format of a Judge0 `POST /submissions?wait=true` response.
#[derive(Debug, Deserialize)]
pub(crate) struct Judge0Response {
    pub status: Judge0Status,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    #[serde(default, deserialize_with = "de_metric")]
    pub time: Option<f64>,
    #[serde(default, deserialize_with = "de_metric")]
    pub memory: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Judge0Status {
    #[allow(dead_code)]
    pub id: Option<i32>,
    pub description: String,
}

impl From<Judge0Response> for Evaluation {
    fn from(wire: Judge0Response) -> Self {
        Self {
            verdict: wire.status.description,
            stdout: wire.stdout,
            stderr: wire.stderr,
            compile_output: wire.compile_output,
            time: wire.time,
            memory: wire.memory,
        }
    }
}

/// Judge0 reports `time` as a decimal string ("0.002") and `memory` as a
/// number, but older deployments have been seen emitting either as either.
/// Accept both; unparsable values decode as absent.
fn de_metric<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Str(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Num(n)) => Some(n),
        Some(Raw::Str(s)) => s.trim().parse().ok(),
    })
}
