#![forbid(unsafe_code)]

//! Declaration membership catalog.
//!
//! One catalog per scope. Each registered declaration gets a lemma stating
//! that it occurs in its backing list; lookup-type lemmas and the
//! globals/locals disjointness lemma are derived from those. Declarations a
//! scope does not generate are resolved through the parent fixed at
//! construction, so delegation chains are acyclic by construction.

use std::collections::BTreeMap;

use proofgen_term::common::{
    append_list, composition, elem, empty_list, empty_set, fst_id, list_all, map, map_of,
    set_inter, set_max, set_min, set_of_list, snd_id, some,
};
use proofgen_term::{Ident, LemmaDecl, OuterDecl, Proof, Term, TermRef, UniqueNamer};
use tracing::{debug, trace};

use crate::accessor::ProgramAccessor;
use crate::config::ProofGenConfig;
use crate::decl::{Axiom, DeclKey, Function, VarKind, Variable};
use crate::error::{ProofGenError, Result};
use crate::lang::{fun_decl_term, lookup_var_ty, var_decl_term};

const GLOBALS_MAX: &str = "globals_max";
const LOCALS_MIN: &str = "locals_min";
const GLOBALS_LOCALS_DISJ: &str = "globals_locals_disj";
const FUNCS_WF: &str = "funcs_wf";
const CONSTS_WF: &str = "consts_wf";
const GLOBALS_WF: &str = "globals_wf";
const PARAMS_WF: &str = "params_wf";
const LOCALS_WF: &str = "locals_wf";
const VAR_CONTEXT_WF: &str = "var_context_wf";

/// Definition names of the program representation in the scope's theory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramNames {
    pub funcs: String,
    pub axioms: String,
    pub consts: String,
    pub globals: String,
    pub params: String,
    pub locals: String,
    pub cfg: String,
}

impl Default for ProgramNames {
    fn default() -> Self {
        Self {
            funcs: "fdecls".to_string(),
            axioms: "axioms".to_string(),
            consts: "consts_vdecls".to_string(),
            globals: "globals_vdecls".to_string(),
            params: "params_vdecls".to_string(),
            locals: "locals_vdecls".to_string(),
            cfg: "proc_body".to_string(),
        }
    }
}

/// Lemmas keyed by declaration, iterated in insertion order.
#[derive(Debug, Default)]
struct LemmaTable {
    index: BTreeMap<DeclKey, usize>,
    lemmas: Vec<LemmaDecl>,
}

impl LemmaTable {
    fn insert(&mut self, key: DeclKey, lemma: LemmaDecl) -> Result<()> {
        if self.index.contains_key(&key) {
            return Err(ProofGenError::DuplicateMembership { key });
        }
        trace!(lemma = %lemma.name, %key, "membership lemma");
        self.index.insert(key, self.lemmas.len());
        self.lemmas.push(lemma);
        Ok(())
    }

    fn get(&self, key: &DeclKey) -> Option<&LemmaDecl> {
        self.index.get(key).map(|&i| &self.lemmas[i])
    }
}

pub struct MembershipCatalog<'p> {
    parent: Option<&'p dyn ProgramAccessor>,
    theory: String,
    names: ProgramNames,

    generate_functions: bool,
    generate_axioms: bool,
    generate_globals: bool,
    generate_locals: bool,

    params: String,
    locals: String,
    consts: String,
    globals: String,
    functions_decl: TermRef,
    axioms_decl: TermRef,
    params_and_locals: TermRef,
    consts_and_globals: TermRef,
    globals_bound: u32,

    membership: LemmaTable,
    constant_membership: LemmaTable,
    lookup_var_ty: LemmaTable,
    helpers: Vec<LemmaDecl>,

    membership_namer: UniqueNamer<DeclKey>,
    lookup_namer: UniqueNamer<DeclKey>,
}

impl<'p> MembershipCatalog<'p> {
    /// `global_ids` are the ids of this scope's constants and globals,
    /// `local_ids` those of its parameters and locals. The disjointness
    /// lemma is derived from them here.
    pub fn new(
        config: &ProofGenConfig,
        names: ProgramNames,
        global_ids: &[u32],
        local_ids: &[u32],
        parent: Option<&'p dyn ProgramAccessor>,
    ) -> Result<Self> {
        let theory = config.theory_name.clone();
        let qualify = |n: &str| format!("{theory}.{n}");
        let from_parent = |what: &'static str| parent.ok_or(ProofGenError::MissingParent { what });

        let (params, locals) = if config.generate_params_and_locals {
            (qualify(&names.params), qualify(&names.locals))
        } else {
            let p = from_parent("params and locals")?;
            (p.params_decl().to_string(), p.locals_decl().to_string())
        };
        let (consts, globals, globals_bound) = if config.generate_globals_and_constants {
            let bound = global_ids
                .iter()
                .max()
                .copied()
                .unwrap_or_else(|| local_ids.iter().min().copied().unwrap_or(0));
            (qualify(&names.consts), qualify(&names.globals), bound)
        } else {
            let p = from_parent("constants and globals")?;
            (
                p.consts_decl().to_string(),
                p.globals_decl().to_string(),
                p.globals_max_bound(),
            )
        };
        let functions_decl = if config.generate_functions {
            Term::ident(qualify(&names.funcs))
        } else {
            from_parent("functions")?.functions_decl()
        };
        let axioms_decl = if config.generate_axioms {
            Term::ident(qualify(&names.axioms))
        } else {
            from_parent("axioms")?.axioms_decl()
        };

        let params_and_locals = append_list(Term::ident(params.as_str()), Term::ident(locals.as_str()));
        let consts_and_globals = append_list(Term::ident(consts.as_str()), Term::ident(globals.as_str()));

        let mut catalog = Self {
            parent,
            names,
            generate_functions: config.generate_functions,
            generate_axioms: config.generate_axioms,
            generate_globals: config.generate_globals_and_constants,
            generate_locals: config.generate_params_and_locals,
            params,
            locals,
            consts,
            globals,
            functions_decl,
            axioms_decl,
            params_and_locals,
            consts_and_globals,
            globals_bound,
            membership: LemmaTable::default(),
            constant_membership: LemmaTable::default(),
            lookup_var_ty: LemmaTable::default(),
            helpers: Vec::new(),
            membership_namer: UniqueNamer::with_spacer(config.name_spacer.as_str()),
            lookup_namer: UniqueNamer::with_spacer(config.name_spacer.as_str()),
            theory,
        };
        catalog.add_disjointness_lemmas(global_ids, local_ids)?;
        if catalog.generate_functions {
            catalog.add_typing_helper_lemmas();
        }
        debug!(
            theory = %catalog.theory,
            delegated = catalog.parent.is_some(),
            helpers = catalog.helpers.len(),
            "membership catalog created"
        );
        Ok(catalog)
    }

    fn qualify(&self, name: &str) -> String {
        format!("{}.{name}", self.theory)
    }

    fn parent(&self) -> Option<&'p dyn ProgramAccessor> {
        self.parent
    }

    fn membership_name(&mut self, key: &DeclKey, base: &str, prefix: &str) -> String {
        format!("{prefix}{}", self.membership_namer.get_name(key, base))
    }

    pub fn add_function_membership(&mut self, functions: &[Function]) -> Result<()> {
        if !self.generate_functions {
            debug!("function membership delegated to the enclosing scope");
            return Ok(());
        }
        let list = Term::ident(self.names.funcs.as_str());
        let proof = format!("(simp add: {}_def)", self.names.funcs);
        for f in functions {
            let key = f.key();
            let statement = Term::eq(
                map_of(list.clone(), Term::string(f.name.as_str())),
                some(fun_decl_term(f)?),
            );
            let name = self.membership_name(&key, &f.name, "mfun_");
            self.membership
                .insert(key, LemmaDecl::new(name, statement, Proof::by(proof.clone())))?;
        }
        Ok(())
    }

    /// Registers membership for `vars` of the given kind and derives their
    /// lookup-type lemmas. With `generate` unset, membership is cited from
    /// the enclosing scope instead of being proved here.
    pub fn add_variable_membership(
        &mut self,
        vars: &[Variable],
        kind: VarKind,
        generate: bool,
    ) -> Result<()> {
        if generate {
            if kind == VarKind::Constant {
                let consts = Term::ident(self.consts.as_str());
                let proof = format!("(simp add: {}_def)", self.consts);
                for v in vars {
                    let key = v.key();
                    let statement = Term::eq(
                        map_of(consts.clone(), Term::nat(u64::from(v.id))),
                        some(var_decl_term(v)?),
                    );
                    let name = self.membership_name(&key, &v.name, "mconst_");
                    self.constant_membership
                        .insert(key, LemmaDecl::new(name, statement, Proof::by(proof.clone())))?;
                }
            }

            let (list, defs) = match kind {
                VarKind::Constant | VarKind::Global => (
                    self.consts_and_globals.clone(),
                    vec![format!("{}_def", self.consts), format!("{}_def", self.globals)],
                ),
                VarKind::ParamOrLocal => (
                    self.params_and_locals.clone(),
                    vec![format!("{}_def", self.params), format!("{}_def", self.locals)],
                ),
            };
            for v in vars {
                let key = v.key();
                let statement = Term::eq(
                    map_of(list.clone(), Term::nat(u64::from(v.id))),
                    some(var_decl_term(v)?),
                );
                let proof = if kind == VarKind::Constant {
                    let mconst = self
                        .constant_membership
                        .get(&key)
                        .map(|l| l.name.clone())
                        .ok_or_else(|| ProofGenError::MissingMembership { key: key.clone() })?;
                    Proof::by(format!("(simp add: {mconst} del: Nat.One_nat_def)"))
                } else {
                    Proof::by(format!("(simp add: {})", defs.join(" ")))
                };
                let name = self.membership_name(&key, &v.name, "m_");
                self.membership
                    .insert(key, LemmaDecl::new(name, statement, proof))?;
            }
        }

        self.add_lookup_type_lemmas(vars)
    }

    /// `lookup_var_ty (consts @ globals, params @ locals) id = Some ty` for
    /// each variable. Needs the membership lemma of every variable, proved
    /// here or in an enclosing scope.
    pub fn add_lookup_type_lemmas(&mut self, vars: &[Variable]) -> Result<()> {
        let disj = self.globals_locals_disjoint_lemma();
        for v in vars {
            let key = v.key();
            let mem = self.membership_lemma(&key)?;
            let statement = Term::eq(
                lookup_var_ty(self.var_context(), Term::nat(u64::from(v.id))),
                some(var_decl_term(v)?),
            );
            let proof = Proof::new(vec![
                format!("using {disj} {mem}"),
                "by (simp add: lookup_var_ty_global_2 lookup_var_ty_local)".to_string(),
            ]);
            let name = self.lookup_namer.get_name(&key, &format!("l_{}", v.name));
            self.lookup_var_ty
                .insert(key, LemmaDecl::new(name, statement, proof))?;
        }
        Ok(())
    }

    pub fn add_axiom_membership(&mut self, axioms: &[Axiom]) -> Result<()> {
        if !self.generate_axioms {
            debug!("axiom membership delegated to the enclosing scope");
            return Ok(());
        }
        let set = set_of_list(Term::ident(self.names.axioms.as_str()));
        let proof = format!("(simp add: {}_def)", self.names.axioms);
        for ax in axioms {
            let statement = elem(ax.term.clone(), set.clone());
            let name = format!("ma_{}", ax.index);
            self.membership
                .insert(ax.key(), LemmaDecl::new(name, statement, Proof::by(proof.clone())))?;
        }
        Ok(())
    }

    fn check_bound(
        lemma: &'static str,
        ids: &[u32],
        bound: u32,
        holds: impl Fn(u32) -> bool,
    ) -> Result<()> {
        match ids.iter().find(|&&id| !holds(id)) {
            Some(&id) => Err(ProofGenError::BoundViolated { lemma, id, bound }),
            None => Ok(()),
        }
    }

    fn add_disjointness_lemmas(&mut self, global_ids: &[u32], local_ids: &[u32]) -> Result<()> {
        let global_names = map(fst_id(), self.consts_and_globals.clone());
        let local_names = map(fst_id(), self.params_and_locals.clone());

        let globals_bound = self.globals_bound;
        Self::check_bound(GLOBALS_MAX, global_ids, globals_bound, |id| id <= globals_bound)?;
        if self.generate_globals {
            self.add_bound_lemma(true, globals_bound, global_names.clone());
        }

        let locals_bound = local_ids
            .iter()
            .min()
            .copied()
            .unwrap_or_else(|| globals_bound.saturating_add(1));
        Self::check_bound(LOCALS_MIN, local_ids, locals_bound, |id| id >= locals_bound)?;
        self.add_bound_lemma(false, locals_bound, local_names.clone());

        let statement = Term::eq(
            set_inter(set_of_list(global_names), set_of_list(local_names)),
            empty_set(),
        );
        // Only lists this scope defines may be unfolded; cited lists are
        // separated through the bound lemmas.
        let unfold = if self.generate_globals && global_ids.is_empty() {
            Some((&self.consts, &self.globals))
        } else if self.generate_locals && local_ids.is_empty() {
            Some((&self.params, &self.locals))
        } else {
            None
        };
        let proof = match unfold {
            Some((first, second)) => Proof::new(vec![
                format!("unfolding {first}_def {second}_def"),
                "by simp".to_string(),
            ]),
            None => {
                if globals_bound >= locals_bound {
                    return Err(ProofGenError::RangesOverlap {
                        globals_max: globals_bound,
                        locals_min: locals_bound,
                    });
                }
                Proof::new(vec![
                    format!(
                        "using {} {}",
                        self.locals_at_least_min(),
                        self.globals_at_most_max()?
                    ),
                    "by fastforce".to_string(),
                ])
            }
        };
        self.push_helper(LemmaDecl::new(GLOBALS_LOCALS_DISJ, statement, proof));
        Ok(())
    }

    fn add_bound_lemma(&mut self, is_global: bool, bound: u32, names: TermRef) {
        let (name, first, second) = if is_global {
            (GLOBALS_MAX, &self.consts, &self.globals)
        } else {
            (LOCALS_MIN, &self.params, &self.locals)
        };
        let bound_term = Term::nat(u64::from(bound));
        let names_set = set_of_list(names.clone());

        let aux_name = format!("{name}_aux");
        let aux_stmt = Term::implies(
            Term::neq(names, empty_list()),
            if is_global {
                Term::le(set_max(names_set.clone()), bound_term.clone())
            } else {
                Term::ge(set_min(names_set.clone()), bound_term.clone())
            },
        );
        let aux = LemmaDecl::new(
            aux_name.clone(),
            aux_stmt,
            Proof::new(vec![
                format!("unfolding {first}_def {second}_def"),
                "by simp".to_string(),
            ]),
        );

        let x = Ident::new("x");
        let x_term = Term::from_ident(&x);
        let cmp = if is_global {
            Term::le(x_term.clone(), bound_term)
        } else {
            Term::ge(x_term.clone(), bound_term)
        };
        let main = LemmaDecl::new(
            name,
            Term::forall(vec![x], Term::implies(elem(x_term, names_set), cmp)),
            Proof::new(vec![
                format!(
                    "using {aux_name} {}",
                    if is_global { "helper_max" } else { "helper_min" }
                ),
                "by blast".to_string(),
            ]),
        );
        self.push_helper(aux);
        self.push_helper(main);
    }

    fn add_typing_helper_lemmas(&mut self) {
        let wf_ty0 = Term::call("wf_ty", vec![Term::nat(0)]);
        let wf_lemma = |name: &str, list: &str, pred: TermRef| {
            LemmaDecl::new(
                name,
                list_all(composition(pred, snd_id()), Term::ident(list)),
                Proof::new(vec![format!("unfolding {list}_def"), "by simp".to_string()]),
            )
        };
        let lemmas = [
            wf_lemma(FUNCS_WF, &self.names.funcs, Term::ident("wf_fdecl")),
            wf_lemma(CONSTS_WF, &self.names.consts, wf_ty0.clone()),
            wf_lemma(GLOBALS_WF, &self.names.globals, wf_ty0.clone()),
            wf_lemma(PARAMS_WF, &self.names.params, wf_ty0.clone()),
            wf_lemma(LOCALS_WF, &self.names.locals, wf_ty0.clone()),
        ];
        for l in lemmas {
            self.push_helper(l);
        }

        let x = Ident::new("x");
        let tau = Ident::new("\\<tau>");
        let stmt = Term::forall(
            vec![x.clone(), tau.clone()],
            Term::implies(
                Term::eq(
                    lookup_var_ty(self.var_context(), Term::from_ident(&x)),
                    some(Term::from_ident(&tau)),
                ),
                Term::app(wf_ty0, vec![Term::from_ident(&tau)]),
            ),
        );
        self.push_helper(LemmaDecl::new(
            VAR_CONTEXT_WF,
            stmt,
            Proof::new(vec![
                "apply (rule lookup_ty_pred_2)".to_string(),
                format!("by (simp_all add: {CONSTS_WF} {GLOBALS_WF} {PARAMS_WF} {LOCALS_WF})"),
            ]),
        ));
    }

    pub fn disjointness_lemma(&self) -> Option<&LemmaDecl> {
        self.helpers.iter().find(|l| l.name == GLOBALS_LOCALS_DISJ)
    }

    /// Typing well-formedness lemmas; empty unless functions are generated
    /// at this scope.
    pub fn well_formedness_lemmas(&self) -> Vec<&LemmaDecl> {
        const WF: [&str; 6] = [
            FUNCS_WF,
            CONSTS_WF,
            GLOBALS_WF,
            PARAMS_WF,
            LOCALS_WF,
            VAR_CONTEXT_WF,
        ];
        self.helpers
            .iter()
            .filter(|l| WF.contains(&l.name.as_str()))
            .collect()
    }

    fn push_helper(&mut self, lemma: LemmaDecl) {
        trace!(lemma = %lemma.name, "helper lemma");
        self.helpers.push(lemma);
    }

    /// Helper lemmas, constant membership, membership, then lookup-type
    /// lemmas, each group in registration order.
    pub fn outer_decls(&self) -> Vec<OuterDecl> {
        self.helpers
            .iter()
            .chain(&self.constant_membership.lemmas)
            .chain(&self.membership.lemmas)
            .chain(&self.lookup_var_ty.lemmas)
            .cloned()
            .map(OuterDecl::from)
            .collect()
    }
}

impl ProgramAccessor for MembershipCatalog<'_> {
    fn theory_name(&self) -> &str {
        &self.theory
    }

    fn functions_decl(&self) -> TermRef {
        self.functions_decl.clone()
    }

    fn axioms_decl(&self) -> TermRef {
        self.axioms_decl.clone()
    }

    fn cfg_decl(&self) -> TermRef {
        Term::ident(self.qualify(&self.names.cfg))
    }

    fn params_decl(&self) -> &str {
        &self.params
    }

    fn locals_decl(&self) -> &str {
        &self.locals
    }

    fn consts_decl(&self) -> &str {
        &self.consts
    }

    fn globals_decl(&self) -> &str {
        &self.globals
    }

    fn params_and_locals_decl(&self) -> TermRef {
        self.params_and_locals.clone()
    }

    fn consts_and_globals_decl(&self) -> TermRef {
        self.consts_and_globals.clone()
    }

    fn var_context(&self) -> TermRef {
        Term::tuple(vec![
            self.consts_and_globals.clone(),
            self.params_and_locals.clone(),
        ])
    }

    fn membership_lemma(&self, key: &DeclKey) -> Result<String> {
        if let Some(l) = self.membership.get(key) {
            return Ok(self.qualify(&l.name));
        }
        match self.parent() {
            Some(p) => p.membership_lemma(key),
            None => Err(ProofGenError::MissingMembership { key: key.clone() }),
        }
    }

    fn constant_membership_lemma(&self, key: &DeclKey) -> Result<String> {
        if let Some(l) = self.constant_membership.get(key) {
            return Ok(self.qualify(&l.name));
        }
        match self.parent() {
            Some(p) => p.constant_membership_lemma(key),
            None => Err(ProofGenError::MissingMembership { key: key.clone() }),
        }
    }

    fn lookup_var_ty_lemma(&self, key: &DeclKey) -> Result<String> {
        if let Some(l) = self.lookup_var_ty.get(key) {
            return Ok(self.qualify(&l.name));
        }
        match self.parent() {
            Some(p) => p.lookup_var_ty_lemma(key),
            None => Err(ProofGenError::MissingMembership { key: key.clone() }),
        }
    }

    fn globals_locals_disjoint_lemma(&self) -> String {
        self.qualify(GLOBALS_LOCALS_DISJ)
    }

    fn globals_at_most_max(&self) -> Result<String> {
        if self.generate_globals {
            return Ok(self.qualify(GLOBALS_MAX));
        }
        self.parent()
            .ok_or(ProofGenError::MissingParent {
                what: "constants and globals",
            })?
            .globals_at_most_max()
    }

    fn locals_at_least_min(&self) -> String {
        self.qualify(LOCALS_MIN)
    }

    fn globals_max_bound(&self) -> u32 {
        self.globals_bound
    }

    fn funcs_wf_lemma(&self) -> Result<String> {
        if self.generate_functions {
            return Ok(self.qualify(FUNCS_WF));
        }
        self.parent()
            .ok_or(ProofGenError::MissingParent { what: "functions" })?
            .funcs_wf_lemma()
    }

    fn var_context_wf_lemma(&self) -> Result<String> {
        if self.generate_functions {
            return Ok(self.qualify(VAR_CONTEXT_WF));
        }
        self.parent()
            .ok_or(ProofGenError::MissingParent { what: "functions" })?
            .var_context_wf_lemma()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::Ty;

    fn root_config() -> ProofGenConfig {
        ProofGenConfig {
            theory_name: "root".to_string(),
            ..ProofGenConfig::default()
        }
    }

    fn lemma<'a>(decls: &'a [OuterDecl], name: &str) -> &'a LemmaDecl {
        decls
            .iter()
            .find_map(|d| match d {
                OuterDecl::Lemma(l) if l.name == name => Some(l),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no lemma {name}"))
    }

    #[test]
    fn constants_get_two_lemmas() {
        let mut cat =
            MembershipCatalog::new(&root_config(), ProgramNames::default(), &[0], &[1], None)
                .expect("catalog");
        let c = Variable::new("c", Ty::Int, 0);
        cat.add_variable_membership(std::slice::from_ref(&c), VarKind::Constant, true)
            .expect("membership");

        assert_eq!(
            cat.constant_membership_lemma(&c.key()).as_deref(),
            Ok("root.mconst_c")
        );
        assert_eq!(cat.membership_lemma(&c.key()).as_deref(), Ok("root.m_c"));
        assert_eq!(cat.lookup_var_ty_lemma(&c.key()).as_deref(), Ok("root.l_c"));

        let decls = cat.outer_decls();
        let m = lemma(&decls, "m_c");
        assert_eq!(
            m.proof.methods,
            vec!["by (simp add: mconst_c del: Nat.One_nat_def)".to_string()]
        );
        let l = lemma(&decls, "l_c");
        assert_eq!(l.proof.methods[0], "using root.globals_locals_disj root.m_c");
    }

    #[test]
    fn equal_names_get_distinct_lemmas() {
        let mut cat =
            MembershipCatalog::new(&root_config(), ProgramNames::default(), &[0, 1], &[], None)
                .expect("catalog");
        let vars = [Variable::new("g", Ty::Int, 0), Variable::new("g", Ty::Bool, 1)];
        cat.add_variable_membership(&vars, VarKind::Global, true)
            .expect("membership");
        assert_eq!(cat.membership_lemma(&vars[1].key()).as_deref(), Ok("root.m_g_0"));
        assert_eq!(
            cat.add_variable_membership(&vars[..1], VarKind::Global, true),
            Err(ProofGenError::DuplicateMembership {
                key: DeclKey::Variable(0)
            })
        );
    }

    #[test]
    fn empty_globals_unfold_the_definitions() {
        let cat = MembershipCatalog::new(&root_config(), ProgramNames::default(), &[], &[0, 1], None)
            .expect("catalog");
        let decls = cat.outer_decls();
        let disj = lemma(&decls, GLOBALS_LOCALS_DISJ);
        assert_eq!(
            disj.proof.methods[0],
            "unfolding root.consts_vdecls_def root.globals_vdecls_def"
        );
    }

    #[test]
    fn empty_locals_unfold_the_definitions_even_at_the_top_id() {
        let cat = MembershipCatalog::new(
            &root_config(),
            ProgramNames::default(),
            &[0, u32::MAX],
            &[],
            None,
        )
        .expect("catalog");
        let decls = cat.outer_decls();
        let disj = lemma(&decls, GLOBALS_LOCALS_DISJ);
        assert_eq!(
            disj.proof.methods[0],
            "unfolding root.params_vdecls_def root.locals_vdecls_def"
        );
        assert_eq!(cat.globals_max_bound(), u32::MAX);
    }

    #[test]
    fn wf_lemmas_only_with_functions() {
        let cfg = ProofGenConfig {
            generate_functions: false,
            ..root_config()
        };
        let parent =
            MembershipCatalog::new(&root_config(), ProgramNames::default(), &[0], &[1], None)
                .expect("parent");
        let child = MembershipCatalog::new(&cfg, ProgramNames::default(), &[0], &[1], Some(&parent))
            .expect("child");
        assert!(
            child
                .outer_decls()
                .iter()
                .all(|d| d.name() != Some(VAR_CONTEXT_WF))
        );
        assert_eq!(child.funcs_wf_lemma().as_deref(), Ok("root.funcs_wf"));
        assert!(lemma(&parent.outer_decls(), VAR_CONTEXT_WF)
            .proof
            .methods
            .contains(&"apply (rule lookup_ty_pred_2)".to_string()));
    }

    #[test]
    fn generated_flags_need_a_parent() {
        let cfg = ProofGenConfig {
            generate_axioms: false,
            ..root_config()
        };
        assert!(matches!(
            MembershipCatalog::new(&cfg, ProgramNames::default(), &[], &[], None),
            Err(ProofGenError::MissingParent { what: "axioms" })
        ));
    }
}
