#![forbid(unsafe_code)]

//! Checkpoint-driven session.
//!
//! The host pipeline reports each stage of the procedure's transformation
//! as it happens. The session keeps the snapshots, the composed block
//! identity maps and the loop and VC hints, and assembles the proof
//! document at the end.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use proofgen_cfg::{
    BlockId, CfgError, ControlFlowGraph, LoopHeadHint, LoopHintTracker, StageMap,
};
use tracing::{debug, trace};

use crate::accessor::ProgramAccessor;
use crate::config::ProofGenConfig;
use crate::decl::{ProgramDecls, VarKind};
use crate::document::ProofDocument;
use crate::end_to_end::SoundnessAssembler;
use crate::error::{ProofGenError, Result};
use crate::membership::{MembershipCatalog, ProgramNames};
use crate::vc::{VcHint, VcHintManager, VcInput};

/// Separates a renamed variable from its version suffix (`x@2`).
const RENAMING_SEPARATOR: char = '@';

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Checkpoint {
    Start,
    Program,
    BeforeAcyclification,
    BeforeRenaming,
    AfterRenaming,
    AfterDeadBlockRemoval,
    AfterUnreachablePruning,
    ProofsGenerated,
}

impl Checkpoint {
    fn name(self) -> &'static str {
        match self {
            Checkpoint::Start => "start",
            Checkpoint::Program => "program",
            Checkpoint::BeforeAcyclification => "before_acyclification",
            Checkpoint::BeforeRenaming => "before_renaming",
            Checkpoint::AfterRenaming => "after_renaming",
            Checkpoint::AfterDeadBlockRemoval => "after_dead_block_removal",
            Checkpoint::AfterUnreachablePruning => "after_unreachable_pruning",
            Checkpoint::ProofsGenerated => "generate_all_proofs",
        }
    }

    fn successor(self) -> Option<Checkpoint> {
        Some(match self {
            Checkpoint::Start => Checkpoint::Program,
            Checkpoint::Program => Checkpoint::BeforeAcyclification,
            Checkpoint::BeforeAcyclification => Checkpoint::BeforeRenaming,
            Checkpoint::BeforeRenaming => Checkpoint::AfterRenaming,
            Checkpoint::AfterRenaming => Checkpoint::AfterDeadBlockRemoval,
            Checkpoint::AfterDeadBlockRemoval => Checkpoint::AfterUnreachablePruning,
            Checkpoint::AfterUnreachablePruning => Checkpoint::ProofsGenerated,
            Checkpoint::ProofsGenerated => return None,
        })
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A CFG at one stage, with the identity map to the stage reported before
/// it.
#[derive(Clone, Debug)]
pub struct CfgSnapshot {
    pub graph: ControlFlowGraph,
    pub to_previous: StageMap,
}

impl CfgSnapshot {
    /// Snapshot of a stage that kept every block.
    pub fn unchanged(graph: ControlFlowGraph) -> Self {
        let to_previous = StageMap::identity(&graph);
        Self { graph, to_previous }
    }

    pub fn new(graph: ControlFlowGraph, to_previous: StageMap) -> Self {
        Self { graph, to_previous }
    }
}

pub struct ProofGenSession {
    config: ProofGenConfig,
    reached: Checkpoint,
    program: Option<ProgramDecls>,
    loop_hints: Option<LoopHintTracker>,
    /// Current stage to the graph before acyclification.
    to_origin: Option<StageMap>,
    renamed: BTreeMap<String, String>,
    final_graph: Option<ControlFlowGraph>,
    vc_hints: VcHintManager,
}

impl ProofGenSession {
    pub fn new(config: ProofGenConfig) -> Self {
        Self {
            config,
            reached: Checkpoint::Start,
            program: None,
            loop_hints: None,
            to_origin: None,
            renamed: BTreeMap::new(),
            final_graph: None,
            vc_hints: VcHintManager::default(),
        }
    }

    fn advance(&mut self, to: Checkpoint) -> Result<()> {
        let expected = self.reached.successor();
        if expected != Some(to) {
            return Err(ProofGenError::CheckpointOrder {
                checkpoint: to.name(),
                expected: expected.map_or("nothing", Checkpoint::name),
            });
        }
        debug!(checkpoint = %to, "checkpoint reached");
        self.reached = to;
        Ok(())
    }

    fn require(&self, at: Checkpoint, operation: &'static str) -> Result<()> {
        if self.reached == at {
            Ok(())
        } else {
            Err(ProofGenError::CheckpointOrder {
                checkpoint: operation,
                expected: at.name(),
            })
        }
    }

    /// Declarations of the procedure. Parameter and local names must be
    /// unique since the VC refers to them by name.
    pub fn program(&mut self, decls: ProgramDecls) -> Result<()> {
        self.advance(Checkpoint::Program)?;
        let duplicate = {
            let mut seen = BTreeSet::new();
            decls
                .params_and_locals()
                .find(|v| !seen.insert(v.name.as_str()))
                .map(|v| v.name.clone())
        };
        if let Some(name) = duplicate {
            return Err(ProofGenError::DuplicateVariable { name });
        }
        debug!(
            functions = decls.functions.len(),
            axioms = decls.axioms.len(),
            params = decls.params.len(),
            locals = decls.locals.len(),
            "program captured"
        );
        self.program = Some(decls);
        Ok(())
    }

    /// Loop structure is read from this graph; hints are recorded through
    /// [`ProofGenSession::loop_hints_mut`] until the next checkpoint.
    pub fn before_acyclification(&mut self, graph: &ControlFlowGraph) -> Result<()> {
        self.advance(Checkpoint::BeforeAcyclification)?;
        let tracker = LoopHintTracker::new(graph);
        debug!(
            blocks = graph.len(),
            loops = graph.loop_headers().len(),
            "loop structure captured"
        );
        self.loop_hints = Some(tracker);
        Ok(())
    }

    pub fn loop_hints(&self) -> Option<&LoopHintTracker> {
        self.loop_hints.as_ref()
    }

    pub fn loop_hints_mut(&mut self) -> Option<&mut LoopHintTracker> {
        self.loop_hints.as_mut()
    }

    /// The acyclic graph; `to_previous` maps it onto the graph reported
    /// before acyclification.
    pub fn before_renaming(&mut self, snapshot: CfgSnapshot) -> Result<()> {
        self.advance(Checkpoint::BeforeRenaming)?;
        snapshot.to_previous.check_total(&snapshot.graph)?;
        if let Some(tracker) = self.loop_hints.as_mut() {
            tracker.set_post_to_pre(snapshot.to_previous.clone());
            tracker.validate_post_graph(&snapshot.graph)?;
        }
        self.to_origin = Some(snapshot.to_previous);
        Ok(())
    }

    /// Records renamed variables. Each `name@k` must refer to a parameter or
    /// local of the program.
    pub fn after_renaming<'n>(&mut self, renamed: impl IntoIterator<Item = &'n str>) -> Result<()> {
        self.advance(Checkpoint::AfterRenaming)?;
        let program = self.program.as_ref().ok_or(ProofGenError::CheckpointOrder {
            checkpoint: Checkpoint::AfterRenaming.name(),
            expected: Checkpoint::Program.name(),
        })?;
        for name in renamed {
            let original = name
                .split_once(RENAMING_SEPARATOR)
                .map_or(name, |(prefix, _)| prefix);
            if !program.params_and_locals().any(|v| v.name == original) {
                return Err(ProofGenError::VariableMapping {
                    name: name.to_string(),
                });
            }
            self.renamed.insert(name.to_string(), original.to_string());
        }
        debug!(renamed = self.renamed.len(), "renaming captured");
        Ok(())
    }

    fn chain(&mut self, snapshot: &CfgSnapshot) -> Result<()> {
        snapshot.to_previous.check_total(&snapshot.graph)?;
        let earlier = self.to_origin.as_ref().ok_or(CfgError::StageMapNotSet)?;
        self.to_origin = Some(snapshot.to_previous.compose(earlier)?);
        Ok(())
    }

    pub fn after_dead_block_removal(&mut self, snapshot: CfgSnapshot) -> Result<()> {
        self.advance(Checkpoint::AfterDeadBlockRemoval)?;
        self.chain(&snapshot)
    }

    /// The final program graph, the one the VC is generated for.
    pub fn after_unreachable_pruning(&mut self, snapshot: CfgSnapshot) -> Result<()> {
        self.advance(Checkpoint::AfterUnreachablePruning)?;
        self.chain(&snapshot)?;
        self.final_graph = Some(snapshot.graph);
        Ok(())
    }

    /// Identity map from the current stage to the graph before
    /// acyclification.
    pub fn to_origin(&self) -> Option<&StageMap> {
        self.to_origin.as_ref()
    }

    pub fn renamed_vars(&self) -> &BTreeMap<String, String> {
        &self.renamed
    }

    /// Block of the graph before acyclification that a block of the
    /// current stage descends from.
    pub fn origin_of(&self, block: BlockId) -> Result<BlockId> {
        let to_origin = self.to_origin.as_ref().ok_or(CfgError::StageMapNotSet)?;
        Ok(to_origin.resolve(block)?)
    }

    /// Loop hint of the header a current-stage block descends from, if any.
    pub fn loop_hint_for_block(&self, block: BlockId) -> Result<Option<&LoopHeadHint>> {
        let origin = self.origin_of(block)?;
        Ok(self
            .loop_hints
            .as_ref()
            .and_then(|tracker| tracker.is_loop_header(origin)))
    }

    /// Hints are keyed by final block; the block must descend from a block
    /// of the original graph.
    pub fn next_hint_for_block(&mut self, block: BlockId, hint: VcHint) -> Result<()> {
        self.require(Checkpoint::AfterUnreachablePruning, "next_hint_for_block")?;
        if !self.final_graph.as_ref().is_some_and(|g| g.contains(block)) {
            return Err(CfgError::UnknownBlock(block).into());
        }
        let origin = self.origin_of(block)?;
        trace!(%block, %origin, "vc hint for block");
        self.vc_hints.next_hint_for_block(block, hint);
        Ok(())
    }

    /// Assembles the proof document for the final program. Declarations not
    /// generated by this session's configuration are cited from `parent`.
    pub fn generate_all_proofs(
        &mut self,
        vc: &VcInput,
        parent: Option<&dyn ProgramAccessor>,
    ) -> Result<ProofDocument> {
        self.require(Checkpoint::AfterUnreachablePruning, "generate_all_proofs")?;
        let missing = |what: &'static str| ProofGenError::CheckpointOrder {
            checkpoint: "generate_all_proofs",
            expected: what,
        };
        let program = self.program.as_ref().ok_or_else(|| missing("program"))?;
        let graph = self
            .final_graph
            .as_ref()
            .ok_or_else(|| missing("after_unreachable_pruning"))?;
        let config = &self.config;

        let mut catalog = MembershipCatalog::new(
            config,
            ProgramNames::default(),
            &program.global_ids(),
            &program.local_ids(),
            parent,
        )?;
        catalog.add_function_membership(&program.functions)?;
        catalog.add_axiom_membership(&program.axioms)?;
        catalog.add_variable_membership(
            &program.constants,
            VarKind::Constant,
            config.generate_globals_and_constants,
        )?;
        catalog.add_variable_membership(
            &program.globals,
            VarKind::Global,
            config.generate_globals_and_constants,
        )?;
        let params_and_locals: Vec<_> = program.params_and_locals().cloned().collect();
        catalog.add_variable_membership(
            &params_and_locals,
            VarKind::ParamOrLocal,
            config.generate_params_and_locals,
        )?;

        let proof = SoundnessAssembler::new(&catalog, program, vc, graph)
            .passification_locale(config.passification_locale.as_str())
            .renamed_vars(self.renamed.clone())
            .generate_proof()?;

        let mut decls = catalog.outer_decls();
        decls.extend(self.vc_hints.hint_decls(graph));
        decls.extend(proof);

        let doc = ProofDocument::new(config.theory_name.as_str(), config.imports.clone(), decls);
        debug!(
            theory = %doc.theory_name,
            decls = doc.decls.len(),
            "proof document assembled"
        );
        self.reached = Checkpoint::ProofsGenerated;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{Ty, Variable};
    use crate::vc::Subsumption;
    use proofgen_cfg::{Block, Cmd};
    use proofgen_term::Term;

    fn single_block() -> ControlFlowGraph {
        ControlFlowGraph::new(Block::new(BlockId(0), "entry", vec![]))
    }

    fn program() -> ProgramDecls {
        ProgramDecls {
            params: vec![Variable::new("x", Ty::Int, 0)],
            ..ProgramDecls::default()
        }
    }

    #[test]
    fn checkpoints_must_fire_in_order() {
        let mut s = ProofGenSession::new(ProofGenConfig::default());
        assert_eq!(
            s.before_acyclification(&single_block()),
            Err(ProofGenError::CheckpointOrder {
                checkpoint: "before_acyclification",
                expected: "program",
            })
        );
        s.program(program()).expect("program");
        assert!(matches!(
            s.program(program()),
            Err(ProofGenError::CheckpointOrder { .. })
        ));
    }

    #[test]
    fn renamed_names_map_to_their_prefix() {
        let mut s = ProofGenSession::new(ProofGenConfig::default());
        s.program(program()).expect("program");
        s.before_acyclification(&single_block()).expect("acyclification");
        s.before_renaming(CfgSnapshot::unchanged(single_block()))
            .expect("renaming");
        s.after_renaming(["x@1", "x"]).expect("renamed");
        assert_eq!(s.renamed_vars().get("x@1").map(String::as_str), Some("x"));
    }

    #[test]
    fn unknown_renamed_variable_is_rejected() {
        let mut s = ProofGenSession::new(ProofGenConfig::default());
        s.program(program()).expect("program");
        s.before_acyclification(&single_block()).expect("acyclification");
        s.before_renaming(CfgSnapshot::unchanged(single_block()))
            .expect("renaming");
        assert_eq!(
            s.after_renaming(["y@1"]),
            Err(ProofGenError::VariableMapping {
                name: "y@1".to_string()
            })
        );
    }

    #[test]
    fn duplicate_local_names_are_rejected() {
        let mut s = ProofGenSession::new(ProofGenConfig::default());
        let decls = ProgramDecls {
            params: vec![Variable::new("x", Ty::Int, 0)],
            locals: vec![Variable::new("x", Ty::Bool, 1)],
            ..ProgramDecls::default()
        };
        assert_eq!(
            s.program(decls),
            Err(ProofGenError::DuplicateVariable {
                name: "x".to_string()
            })
        );
    }

    fn block(n: u32, label: &str) -> Block {
        Block::new(
            BlockId(n),
            label,
            vec![Cmd::Assume(Term::bool_lit(true))],
        )
    }

    /// entry(0) -> H(1) -> S(2) -> H(1), H(1) -> exit(3)
    fn single_loop() -> ControlFlowGraph {
        let mut g = ControlFlowGraph::new(block(0, "entry"));
        g.add_block(block(1, "head")).expect("block");
        g.add_block(block(2, "body")).expect("block");
        g.add_block(block(3, "exit")).expect("block");
        g.add_edge(BlockId(0), BlockId(1)).expect("edge");
        g.add_edge(BlockId(1), BlockId(2)).expect("edge");
        g.add_edge(BlockId(2), BlockId(1)).expect("edge");
        g.add_edge(BlockId(1), BlockId(3)).expect("edge");
        g
    }

    #[test]
    fn hints_resolve_through_renumbered_and_pruned_stages() {
        let loop_hint = LoopHeadHint {
            invariants: vec![Term::ge(Term::ident("x"), Term::int(0))],
            modified_vars: vec!["x".to_string()],
        };
        let mut s = ProofGenSession::new(ProofGenConfig::default());
        s.program(program()).expect("program");
        s.before_acyclification(&single_loop()).expect("acyclification");
        s.loop_hints_mut()
            .expect("tracker")
            .record_hint(BlockId(1), loop_hint.clone())
            .expect("loop hint");

        // the backedge is cut; ids are kept
        let mut acyclic = ControlFlowGraph::new(block(0, "entry"));
        acyclic.add_block(block(1, "head")).expect("block");
        acyclic.add_block(block(2, "body")).expect("block");
        acyclic.add_block(block(3, "exit")).expect("block");
        acyclic.add_edge(BlockId(0), BlockId(1)).expect("edge");
        acyclic.add_edge(BlockId(1), BlockId(2)).expect("edge");
        acyclic.add_edge(BlockId(1), BlockId(3)).expect("edge");
        s.before_renaming(CfgSnapshot::unchanged(acyclic.clone()))
            .expect("renaming");
        s.after_renaming(["x@1"]).expect("renamed");
        s.after_dead_block_removal(CfgSnapshot::unchanged(acyclic))
            .expect("dead blocks");

        // the body is pruned and the survivors renumbered
        let mut pruned = ControlFlowGraph::new(block(10, "entry"));
        pruned.add_block(block(11, "head")).expect("block");
        pruned.add_block(block(13, "exit")).expect("block");
        pruned.add_edge(BlockId(10), BlockId(11)).expect("edge");
        pruned.add_edge(BlockId(11), BlockId(13)).expect("edge");
        let mut map = StageMap::new();
        for n in [0, 1, 3] {
            map.insert(BlockId(n + 10), BlockId(n)).expect("map");
        }
        s.after_unreachable_pruning(CfgSnapshot::new(pruned, map))
            .expect("pruning");

        assert_eq!(s.origin_of(BlockId(11)), Ok(BlockId(1)));
        assert_eq!(s.loop_hint_for_block(BlockId(11)), Ok(Some(&loop_hint)));
        assert_eq!(s.loop_hint_for_block(BlockId(13)), Ok(None));
        assert_eq!(
            s.origin_of(BlockId(2)),
            Err(ProofGenError::from(CfgError::MissingStageMapping(BlockId(2))))
        );

        let hint = VcHint {
            expr: Term::bool_lit(true),
            post: Term::bool_lit(true),
            result: Term::bool_lit(true),
            subsumption: Subsumption::Always,
        };
        s.next_hint_for_block(BlockId(13), hint.clone())
            .expect("hint on a surviving block");
        assert_eq!(
            s.next_hint_for_block(BlockId(2), hint),
            Err(ProofGenError::from(CfgError::UnknownBlock(BlockId(2))))
        );
    }

    #[test]
    fn origin_requires_a_recorded_stage_map() {
        let mut s = ProofGenSession::new(ProofGenConfig::default());
        s.program(program()).expect("program");
        assert_eq!(
            s.origin_of(BlockId(0)),
            Err(ProofGenError::from(CfgError::StageMapNotSet))
        );
    }
}
