//! Target descriptors and ordering validation.
//!
//! Each target declares the context keys it reads and writes. Before a run
//! the declarations are turned into a producer -> consumer graph, checked for
//! cycles, and checked against the declared order: every key a target reads
//! must be written by a strictly earlier target or already be in the context.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use serde::Serialize;

use crate::context::keys;

use super::types::{PipelineError, TargetId};

/// A target and the context keys it reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetDescriptor {
  pub id: TargetId,
  pub consumes: &'static [&'static str],
  pub produces: &'static [&'static str],
}

/// The packaging targets in the order they run.
pub fn default_targets() -> Vec<TargetDescriptor> {
  vec![
    TargetDescriptor {
      id: TargetId::Prepare,
      consumes: &[],
      produces: &[
        keys::BUILD_VERSION,
        keys::CONFIGURATION,
        keys::VERSION_BADGE,
        keys::COMBINED_HOST_ARCHIVE,
        keys::COMBINED_NO_HOST_ARCHIVE,
        keys::SDK_SYMBOLS_ARCHIVE,
      ],
    },
    TargetDescriptor {
      id: TargetId::InitPackage,
      consumes: &[],
      produces: &[
        keys::SDK_ROOT,
        keys::SHARED_HOST_ROOT,
        keys::HOST_FXR_ROOT,
        keys::SHARED_FRAMEWORK_ROOT,
        keys::COMBINED_HOST_ROOT,
        keys::COMBINED_NO_HOST_ROOT,
      ],
    },
    TargetDescriptor {
      id: TargetId::GenerateVersionBadge,
      consumes: &[keys::BUILD_VERSION, keys::VERSION_BADGE],
      produces: &[],
    },
    TargetDescriptor {
      id: TargetId::GenerateCompressedFile,
      consumes: &[
        keys::COMBINED_HOST_ROOT,
        keys::COMBINED_NO_HOST_ROOT,
        keys::COMBINED_HOST_ARCHIVE,
        keys::COMBINED_NO_HOST_ARCHIVE,
        keys::SDK_SYMBOLS_ARCHIVE,
      ],
      produces: &[],
    },
    TargetDescriptor {
      id: TargetId::GenerateInstaller,
      consumes: &[keys::BUILD_VERSION, keys::CONFIGURATION],
      produces: &[],
    },
    TargetDescriptor {
      id: TargetId::GenerateNugetPackages,
      consumes: &[keys::BUILD_VERSION, keys::CONFIGURATION],
      produces: &[],
    },
    TargetDescriptor {
      id: TargetId::TestInstaller,
      consumes: &[keys::BUILD_VERSION, keys::CONFIGURATION],
      produces: &[],
    },
  ]
}

/// Validate that `targets` can run in the given order.
///
/// `seeded` lists keys already present in the context before the run.
pub fn validate_order<S: AsRef<str>>(targets: &[TargetDescriptor], seeded: &[S]) -> Result<(), PipelineError> {
  let mut graph = DiGraph::<TargetId, ()>::new();
  let nodes: Vec<_> = targets.iter().map(|t| graph.add_node(t.id)).collect();

  // First producer of each key wins; later writes overwrite the same key
  let mut producers: HashMap<&str, usize> = HashMap::new();
  for (idx, target) in targets.iter().enumerate() {
    for key in target.produces {
      producers.entry(*key).or_insert(idx);
    }
  }

  let is_seeded = |key: &str| seeded.iter().any(|s| s.as_ref() == key);

  // Edge from producer to consumer
  for (idx, target) in targets.iter().enumerate() {
    for key in target.consumes {
      if let Some(&producer) = producers.get(key)
        && producer != idx
      {
        graph.add_edge(nodes[producer], nodes[idx], ());
      }
    }
  }

  toposort(&graph, None).map_err(|_| PipelineError::CycleDetected)?;

  for (idx, target) in targets.iter().enumerate() {
    for key in target.consumes {
      if is_seeded(*key) {
        continue;
      }
      match producers.get(key) {
        None => {
          return Err(PipelineError::MissingProducer {
            target: target.id,
            key: key.to_string(),
          });
        }
        Some(&producer) if producer >= idx => {
          return Err(PipelineError::OutOfOrder {
            target: target.id,
            key: key.to_string(),
            producer: targets[producer].id,
          });
        }
        Some(_) => {}
      }
    }
  }

  Ok(())
}
