use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::planner::{QueryPlanner, RetrievalPlan};
use crate::db::{IndexError, SearchHit, SearchIndex};


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Execution {
    pub hits: Vec<SearchHit>,
    pub used_fallback: bool,
    /// Every plan sent to the index, in order. Never more than two.
    pub plans: Vec<RetrievalPlan>,
}


pub struct FallbackExecutor {
    index: Arc<dyn SearchIndex>,
    planner: QueryPlanner,

    executions: AtomicUsize,
    fallback_count: AtomicUsize,
}

impl FallbackExecutor {
    pub fn new(index: Arc<dyn SearchIndex>, planner: QueryPlanner) -> Self {
        info!("FallbackExecutor initialized: index={}", index.name());
        Self {
            index,
            planner,
            executions: AtomicUsize::new(0),
            fallback_count: AtomicUsize::new(0),
        }
    }

    pub fn planner(&self) -> &QueryPlanner {
        &self.planner
    }


    pub async fn execute(&self, plan: RetrievalPlan) -> Result<Execution, IndexError> {
        self.executions.fetch_add(1, Ordering::SeqCst);

        let hits = self.send(&plan).await?;
        if !self.planner.needs_fallback(&plan, hits.len()) {
            return Ok(Execution {
                hits,
                used_fallback: false,
                plans: vec![plan],
            });
        }

        let Some(relaxed) = self.planner.fallback_plan(&plan) else {
            return Ok(Execution {
                hits,
                used_fallback: false,
                plans: vec![plan],
            });
        };

        info!(
            "Strict {} plan returned {} hits (min {}), retrying without brand filter",
            plan.mode.as_str(),
            hits.len(),
            self.planner.min_hits(plan.mode).unwrap_or_default()
        );

        let relaxed_hits = self.send(&relaxed).await?;
        self.fallback_count.fetch_add(1, Ordering::SeqCst);
        info!(
            "Fallback returned {} hits, total_fallbacks={}",
            relaxed_hits.len(),
            self.fallback_count.load(Ordering::SeqCst)
        );

        Ok(Execution {
            hits: relaxed_hits,
            used_fallback: true,
            plans: vec![plan, relaxed],
        })
    }

    async fn send(&self, plan: &RetrievalPlan) -> Result<Vec<SearchHit>, IndexError> {
        self.index.search(plan).await.map_err(|e| {
            warn!("Index '{}' failed for {} plan: {}", self.index.name(), plan.mode.as_str(), e);
            e
        })
    }


    pub fn fallback_count(&self) -> usize {
        self.fallback_count.load(Ordering::SeqCst)
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}
