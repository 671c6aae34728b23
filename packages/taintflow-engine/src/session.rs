//! Analysis session and entry points
//!
//! One `AnalysisSession` is built per compilation: the classification
//! registries, validated configuration, entity interner, summary cache, and
//! callee body provider, all immutable (or internally synchronized) after
//! construction. The session is shared by reference across concurrently
//! analyzed bodies; each body mutates only its own `ProgramState`
//! instances, so no cross-body locking exists beyond the caches.

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::features::entity::EntityInterner;
use crate::features::flow_graph::{BodyProvider, ControlFlowGraph, EmptyBodyProvider};
use crate::features::interprocedural::SummaryCache;
use crate::features::registry::Registries;
use crate::features::reporting::AnalysisOutcome;
use crate::features::solver::{solve_body, CancellationToken};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Per-compilation analysis session
pub struct AnalysisSession {
    id: Uuid,
    registries: Arc<Registries>,
    config: EngineConfig,
    interner: EntityInterner,
    summaries: SummaryCache,
    provider: Arc<dyn BodyProvider>,
}

impl std::fmt::Debug for AnalysisSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisSession")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl AnalysisSession {
    /// Build a session; fails only on invalid configuration
    pub fn new(
        registries: Arc<Registries>,
        config: EngineConfig,
        provider: Arc<dyn BodyProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let summaries = SummaryCache::new(config.summary_cache_size);
        let id = Uuid::new_v4();
        debug!(session = %id, sources = registries.source_count(), sinks = registries.sink_count(), "session created");
        Ok(Self {
            id,
            registries,
            config,
            interner: EntityInterner::new(),
            summaries,
            provider,
        })
    }

    /// Session over the given registries with no analyzable callee bodies
    pub fn with_registries(registries: Registries, config: EngineConfig) -> Result<Self> {
        Self::new(
            Arc::new(registries),
            config,
            Arc::new(EmptyBodyProvider),
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn interner(&self) -> &EntityInterner {
        &self.interner
    }

    pub fn summaries(&self) -> &SummaryCache {
        &self.summaries
    }

    pub fn provider(&self) -> &dyn BodyProvider {
        self.provider.as_ref()
    }

    /// Analyze one body to its fixed point
    pub fn analyze(
        &self,
        cfg: &ControlFlowGraph,
        cancel: &CancellationToken,
    ) -> Result<AnalysisOutcome> {
        let solution = solve_body(cfg, self, cancel)?;
        Ok(AnalysisOutcome {
            findings: solution.findings.into_findings(),
            states: solution.states,
            stats: solution.stats,
        })
    }

    /// Analyze many independent bodies in parallel
    ///
    /// Each body gets its own result; a cancelled body yields
    /// `Err(Cancelled)` without affecting the others.
    pub fn analyze_all(
        &self,
        bodies: &[&ControlFlowGraph],
        cancel: &CancellationToken,
    ) -> Vec<Result<AnalysisOutcome>> {
        bodies
            .par_iter()
            .map(|cfg| self.analyze(cfg, cancel))
            .collect()
    }
}

/// Free-function form of the single entry point:
/// `analyze(cfg, session) -> (program states by block, findings)`
pub fn analyze(
    cfg: &ControlFlowGraph,
    session: &AnalysisSession,
    cancel: &CancellationToken,
) -> Result<AnalysisOutcome> {
    session.analyze(cfg, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, EngineConfig};
    use crate::errors::EngineError;
    use crate::features::flow_graph::CfgBuilder;
    use crate::features::registry::Registries;

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            widening_threshold: 0,
            ..Default::default()
        };
        let err = AnalysisSession::with_registries(Registries::empty(), config).unwrap_err();
        assert!(matches!(err, EngineError::Config(ConfigError::Range { .. })));
    }

    #[test]
    fn test_noop_registries_produce_no_findings() {
        let session =
            AnalysisSession::with_registries(Registries::empty(), EngineConfig::default()).unwrap();
        let mut builder = CfgBuilder::new();
        builder.add_block(vec![]);
        let cfg = builder.build().unwrap();

        let outcome = session.analyze(&cfg, &CancellationToken::new()).unwrap();
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.stats.blocks_processed, 1);
    }

    #[test]
    fn test_pre_cancelled_token_aborts() {
        let session =
            AnalysisSession::with_registries(Registries::empty(), EngineConfig::default()).unwrap();
        let mut builder = CfgBuilder::new();
        builder.add_block(vec![]);
        let cfg = builder.build().unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = session.analyze(&cfg, &cancel).unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
    }

    #[test]
    fn test_sessions_have_distinct_ids() {
        let a = AnalysisSession::with_registries(Registries::empty(), EngineConfig::default())
            .unwrap();
        let b = AnalysisSession::with_registries(Registries::empty(), EngineConfig::default())
            .unwrap();
        assert_ne!(a.id(), b.id());
    }
}
