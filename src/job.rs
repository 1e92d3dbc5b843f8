use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::capture::CaptureRequest;
use crate::engine::invoke::EngineCommand;
use crate::foundation::core::{ChannelLayout, ImageDescriptor, Orientation};
use crate::foundation::error::{CaptureError, CaptureResult};
use crate::protocol::mode::{DEFAULT_ITERATIONS, InvocationMode};

/// Default image edge length for piped renders.
pub const DEFAULT_EDGE: u32 = 900;

/// JSON description of one capture run.
///
/// ```json
/// {
///   "engine": { "program": "./tangerine", "timeout_ms": 60000 },
///   "mode": { "kind": "piped_source", "scene": "models/step-pyramid.rkt", "iterations": 1000 },
///   "width": 900,
///   "height": 900,
///   "out": "test_render.png"
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptureJob {
    /// Engine launch settings.
    pub engine: EngineSpec,
    /// Invocation mode.
    pub mode: JobMode,
    /// Image width in pixels.
    #[serde(default = "default_edge")]
    pub width: u32,
    /// Image height in pixels.
    #[serde(default = "default_edge")]
    pub height: u32,
    /// Channels per pixel in the payload; only `3` is accepted.
    #[serde(default = "default_channels")]
    pub channels: u32,
    /// Source row stride in bytes, `0` for tightly packed.
    #[serde(default)]
    pub stride: usize,
    /// Source row order.
    #[serde(default)]
    pub orientation: Orientation,
    /// PNG output path.
    #[serde(default)]
    pub out: Option<PathBuf>,
}

/// Engine launch settings inside a [`CaptureJob`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSpec {
    /// Engine executable.
    pub program: PathBuf,
    /// Extra arguments placed before the mode arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// Optional wall-clock limit in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Mode selection inside a [`CaptureJob`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobMode {
    /// Pipe a scene file to the engine.
    PipedSource {
        /// Scene description file.
        scene: PathBuf,
        /// Iteration/quality budget.
        #[serde(default = "default_iterations")]
        iterations: u32,
    },
    /// Render the engine's built-in scene.
    BuiltinScene,
}

fn default_edge() -> u32 {
    DEFAULT_EDGE
}

fn default_channels() -> u32 {
    3
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

impl CaptureJob {
    /// Parse a job from JSON text.
    pub fn from_json_str(s: &str) -> CaptureResult<Self> {
        serde_json::from_str(s).map_err(|e| CaptureError::serde(e.to_string()))
    }

    /// Load a job file and resolve its relative paths against the file's directory.
    pub fn from_path(path: &Path) -> CaptureResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read job '{}'", path.display()))?;
        let job = Self::from_json_str(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(job.resolve_paths(base))
    }

    /// Rebase relative scene, output and engine paths onto `base`.
    ///
    /// A bare engine name (no directory component) is left alone so it is looked up on `PATH`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        let rebase = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };
        if let JobMode::PipedSource { scene, .. } = &mut self.mode {
            *scene = rebase(scene.as_path());
        }
        if let Some(out) = &mut self.out {
            *out = rebase(out.as_path());
        }
        if self.engine.program.components().count() > 1 {
            self.engine.program = rebase(&self.engine.program);
        }
        self
    }

    /// Image descriptor implied by the geometry fields.
    pub fn descriptor(&self) -> CaptureResult<ImageDescriptor> {
        let layout = ChannelLayout::from_channel_count(self.channels)?;
        Ok(ImageDescriptor::new(self.width, self.height, layout)?
            .with_stride(self.stride)?
            .with_orientation(self.orientation))
    }

    /// Engine launch configuration.
    pub fn engine_command(&self) -> EngineCommand {
        let mut cmd = EngineCommand::new(&self.engine.program)
            .with_leading_args(self.engine.args.iter().cloned());
        if let Some(ms) = self.engine.timeout_ms {
            cmd = cmd.with_timeout(Duration::from_millis(ms));
        }
        cmd
    }

    /// Build the capture request, reading the scene file for piped mode.
    pub fn request(&self) -> CaptureResult<CaptureRequest> {
        let mode = match &self.mode {
            JobMode::PipedSource { scene, iterations } => {
                let scene = std::fs::read(scene)
                    .with_context(|| format!("read scene '{}'", scene.display()))?;
                InvocationMode::PipedSource {
                    scene,
                    iterations: *iterations,
                }
            }
            JobMode::BuiltinScene => InvocationMode::BuiltinScene,
        };
        Ok(CaptureRequest {
            mode,
            descriptor: self.descriptor()?,
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/job.rs"]
mod tests;
