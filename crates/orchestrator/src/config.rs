//! Inputs of one comparative training run.

use std::path::{Path, PathBuf};

use depthcmp_core::trainer::{StrongSupervision, TrainerInvocation, TrainerProgram};

use crate::error::OrchestratorError;

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub scene: PathBuf,
    /// Monocular depth images used by the weak run.
    pub depth_images: PathBuf,
    pub output_base: PathBuf,
    pub program: TrainerProgram,
    /// Ground-truth depth directory and loss settings for the strong run.
    pub strong: StrongSupervision,
}

impl RunConfig {
    pub fn new(
        scene: impl Into<PathBuf>,
        depth_images: impl Into<PathBuf>,
        gt_depth: impl Into<PathBuf>,
        output_base: impl Into<PathBuf>,
    ) -> Self {
        Self {
            scene: scene.into(),
            depth_images: depth_images.into(),
            output_base: output_base.into(),
            program: TrainerProgram::default(),
            strong: StrongSupervision::new(gt_depth),
        }
    }

    pub fn gt_depth(&self) -> &Path {
        &self.strong.depth_dir
    }

    /// Check the input paths exist, stopping at the first missing one.
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        let inputs = [
            ("Scene path", self.scene.as_path()),
            ("Depth images path", self.depth_images.as_path()),
            ("GT depth path", self.gt_depth()),
        ];

        for (what, path) in inputs {
            if !path.exists() {
                return Err(OrchestratorError::MissingInput {
                    what,
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(())
    }

    pub fn weak_invocation(&self) -> TrainerInvocation {
        TrainerInvocation::weak(&self.scene, &self.depth_images, &self.output_base)
    }

    pub fn strong_invocation(&self) -> TrainerInvocation {
        TrainerInvocation::strong(&self.scene, &self.strong, &self.output_base)
    }
}
