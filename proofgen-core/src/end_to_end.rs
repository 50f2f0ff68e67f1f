#![forbid(unsafe_code)]

//! End-to-end soundness proof: "the VC holds" implies "the procedure's CFG
//! cannot reach a failure state".
//!
//! Assembly runs in two phases. The function phase relates every source
//! function to a VC-level counterpart; the end-to-end phase consumes its
//! result and states and proves the final lemma.

use std::collections::BTreeMap;

use proofgen_cfg::{CfgError, ControlFlowGraph};
use proofgen_term::common::{empty_list, map_of, none, some, the};
use proofgen_term::{
    ContextElem, DefDecl, Equation, FunDecl, Ident, IdentSubst, LemmaDecl, OuterDecl, Proof, Term,
    TermRef, Type, UniqueNamer,
};
use tracing::{debug, trace};

use crate::accessor::ProgramAccessor;
use crate::decl::{Function, ProgramDecls, Ty, TypeCtorDecl, Variable};
use crate::error::{ProofGenError, Result};
use crate::extractor::best_extractor;
use crate::lang::{
    SemanticsContext, axiom_assm, bool_val, cfg_config_node, closed, closed_to_ty,
    closed_ty_term, closedness_assumption, construct_value, destruct_value, failure,
    fun_decl_term, fun_interp_single_wf, fun_interp_wf, left_inv_lemma_name, local_state,
    lookup_var, non_empty_types_assumption, normal, normalized_lookup, prim_closed_ty, pure_fun_type,
    pure_type, red_cfg_multi, red_expr, state_typ_wf, ty_term, ty_to_closed, type_of_val,
    val_of_closed_ty, var_decl_term,
};
use crate::vc::{CastKind, VcAxiomKind, VcInput};

pub const VC_ASSM: &str = "VC";
pub const CLOSED_ASSM: &str = "Closed";
pub const NON_EMPTY_TYPES_ASSM: &str = "NonEmptyTypes";
pub const FINTERP_ASSM: &str = "FInterp";
pub const AXIOMS_ASSM: &str = "Axioms";
pub const PARAMS_LOCAL_ASSM: &str = "ParamsLocal";
pub const RED_ASSM: &str = "Red";

pub const END_TO_END_LEMMA: &str = "end_to_end";

const CTOR_TABLE: &str = "ctor_table";
const CTOR: &str = "ctor";
const VAR_CONTEXT_ABBREV: &str = "?\\<Lambda>";

pub fn vc_fun_name(f: &Function) -> String {
    format!("vc_fun_{}", f.name)
}

pub fn corres_lemma_name(f: &Function) -> String {
    format!("vc_{}_corres", f.name)
}

fn interp_mem_name(f: &Function) -> String {
    format!("im_{}", f.name)
}

fn ctor_lemma_name(name: &str) -> String {
    format!("{CTOR}_{name}")
}

fn quoted(t: &TermRef) -> String {
    format!("\"{t}\"")
}

/// Joins the non-empty parts with single spaces.
fn words<'s>(parts: impl IntoIterator<Item = &'s str>) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Names local to one function definition or lemma.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum FunSlot {
    Function,
    Param(usize),
    TypeParam(usize),
    Fixed(&'static str),
}

/// Universally quantified declarations of the VC hypothesis.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum VcDecl {
    Var(u32),
    Function(String),
}

/// Result of the function phase. Only [`SoundnessAssembler::end_to_end`]
/// consumes it, so the final lemma cannot be assembled before the function
/// correspondences it cites.
#[derive(Debug)]
pub struct FunctionPhase {
    definitions: Vec<OuterDecl>,
    corres_lemmas: Vec<OuterDecl>,
}

impl FunctionPhase {
    pub fn definitions(&self) -> &[OuterDecl] {
        &self.definitions
    }

    pub fn corres_lemmas(&self) -> &[OuterDecl] {
        &self.corres_lemmas
    }
}

pub struct SoundnessAssembler<'a> {
    accessor: &'a dyn ProgramAccessor,
    program: &'a ProgramDecls,
    vc: &'a VcInput,
    cfg: &'a ControlFlowGraph,
    locale: String,
    renamed: BTreeMap<String, String>,
    ctx: SemanticsContext,
    init_state: TermRef,
    final_node: TermRef,
    final_state: TermRef,
}

impl<'a> SoundnessAssembler<'a> {
    /// `cfg` is the final program graph whose entry the reduction starts at.
    pub fn new(
        accessor: &'a dyn ProgramAccessor,
        program: &'a ProgramDecls,
        vc: &'a VcInput,
        cfg: &'a ControlFlowGraph,
    ) -> Self {
        Self {
            accessor,
            program,
            vc,
            cfg,
            locale: "passification".to_string(),
            renamed: BTreeMap::new(),
            ctx: SemanticsContext::default(),
            init_state: Term::ident("n_s"),
            final_node: Term::ident("m'"),
            final_state: Term::ident("s'"),
        }
    }

    /// Locale providing `method_verifies` for the final program.
    pub fn passification_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Renamed VC variable names mapped to the source variable they stand
    /// for.
    pub fn renamed_vars(mut self, renamed: BTreeMap<String, String>) -> Self {
        self.renamed = renamed;
        self
    }

    pub fn generate_proof(&self) -> Result<Vec<OuterDecl>> {
        let phase = self.function_phase()?;
        self.end_to_end(phase)
    }

    pub fn function_phase(&self) -> Result<FunctionPhase> {
        let mut definitions = Vec::new();
        let mut corres_lemmas = Vec::new();
        for f in &self.program.functions {
            definitions.push(OuterDecl::Fun(self.vc_fun_definition(f)?));
        }
        for f in &self.program.functions {
            let lemma = self.corres_lemma(f)?;
            trace!(lemma = %lemma.name, "function correspondence");
            corres_lemmas.push(OuterDecl::Lemma(lemma));
        }
        debug!(functions = self.program.functions.len(), "function phase assembled");
        Ok(FunctionPhase {
            definitions,
            corres_lemmas,
        })
    }

    pub fn end_to_end(&self, phase: FunctionPhase) -> Result<Vec<OuterDecl>> {
        let FunctionPhase {
            mut definitions,
            corres_lemmas,
        } = phase;
        definitions.extend(corres_lemmas);
        definitions.extend(self.vc.axioms.iter().map(|ax| OuterDecl::Def(ax.definition())));
        definitions.extend(self.ctor_decls()?);
        definitions.push(OuterDecl::Declare("One_nat_def[simp del]".to_string()));
        definitions.push(OuterDecl::Lemma(self.final_lemma()?));
        debug!(
            decls = definitions.len(),
            vc_axioms = self.vc.axioms.len(),
            "end-to-end proof assembled"
        );
        Ok(definitions)
    }

    fn function(&self, name: &str) -> Result<&'a Function> {
        self.program
            .functions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ProofGenError::UnknownFunction {
                name: name.to_string(),
            })
    }

    /// A VC variable names a parameter or local directly or through the
    /// renaming map.
    fn vc_variable(&self, vc_var: &str) -> Result<&'a Variable> {
        self.variable_named(vc_var)
            .or_else(|| {
                self.renamed
                    .get(vc_var)
                    .and_then(|orig| self.variable_named(orig))
            })
            .ok_or_else(|| ProofGenError::UnknownVcVariable {
                name: vc_var.to_string(),
            })
    }

    fn variable_named(&self, name: &str) -> Option<&'a Variable> {
        let program: &'a ProgramDecls = self.program;
        program.params_and_locals().find(|v| v.name == name)
    }

    fn value_args(f: &Function, namer: &mut UniqueNamer<FunSlot>) -> Vec<TermRef> {
        f.params
            .iter()
            .enumerate()
            .map(|(i, (name, _))| Term::ident(namer.get_name(&FunSlot::Param(i), name)))
            .collect()
    }

    fn extractor(&self, f: &Function, tv: &str, values: &[TermRef]) -> Result<TermRef> {
        let typed: Vec<(&Ty, TermRef)> = f
            .params
            .iter()
            .zip(values)
            .map(|((_, ty), v)| (ty, v.clone()))
            .collect();
        best_extractor(tv, &self.ctx.abs_val_ty_map, &typed).ok_or_else(|| {
            ProofGenError::UnboundTypeVar {
                name: tv.to_string(),
            }
        })
    }

    /// `vc_fun_f A f tv.. x.. = case f [ty..] [x..] of Some res ⇒ res | None ⇒ default`
    fn vc_fun_definition(&self, f: &Function) -> Result<FunDecl> {
        let a = &self.ctx.abs_val_ty_map;
        let mut namer = UniqueNamer::new();
        let fun_term = Term::ident(namer.get_name(&FunSlot::Function, &f.name));
        let values = Self::value_args(f, &mut namer);

        let mut lhs = vec![a.clone(), fun_term.clone()];
        let mut ty_args = Vec::with_capacity(f.type_params.len());
        let mut subst = BTreeMap::new();
        for (i, tv) in f.type_params.iter().enumerate() {
            let closed_ty = if f.is_implicit(tv) {
                self.extractor(f, tv, &values)?
            } else {
                let t = Term::ident(namer.get_name(&FunSlot::TypeParam(i), tv));
                lhs.push(t.clone());
                t
            };
            ty_args.push(closed_to_ty(closed_ty.clone()));
            subst.insert(tv.clone(), closed_ty);
        }
        lhs.extend(values.iter().cloned());

        let boxed: Vec<TermRef> = f
            .params
            .iter()
            .zip(&values)
            .map(|((_, ty), v)| construct_value(v.clone(), ty))
            .collect();
        let call = Term::app(fun_term, vec![Term::list(ty_args), Term::list(boxed)]);
        let res = Term::ident(namer.get_name(&FunSlot::Fixed("res"), "res"));
        let default = val_of_closed_ty(a, closed_ty_term(&f.ret, &subst)?);
        let body = Term::case_of(
            call,
            vec![
                (some(res.clone()), destruct_value(res, &f.ret)),
                (none(), destruct_value(default, &f.ret)),
            ],
        );

        Ok(FunDecl {
            name: vc_fun_name(f),
            ty: None,
            equations: vec![Equation { lhs, rhs: body }],
        })
    }

    fn corres_lemma(&self, f: &Function) -> Result<LemmaDecl> {
        let a = &self.ctx.abs_val_ty_map;
        let mut namer = UniqueNamer::new();
        let fun_term = Term::ident(namer.get_name(&FunSlot::Function, &f.name));
        let tvs: Vec<TermRef> = f
            .type_params
            .iter()
            .enumerate()
            .map(|(i, tv)| Term::ident(namer.get_name(&FunSlot::TypeParam(i), tv)))
            .collect();
        let values = Self::value_args(f, &mut namer);

        let mut vc_args = vec![a.clone(), fun_term.clone()];
        vc_args.extend(
            f.type_params
                .iter()
                .zip(&tvs)
                .filter(|(tv, _)| !f.is_implicit(tv))
                .map(|(_, t)| ty_to_closed(t.clone())),
        );
        vc_args.extend(values.iter().cloned());
        let vc_call = Term::app(Term::ident(vc_fun_name(f)), vc_args);

        let ty_list = Term::list(tvs.clone());
        let val_list = Term::list(
            f.params
                .iter()
                .zip(&values)
                .map(|((_, ty), v)| construct_value(v.clone(), ty))
                .collect(),
        );
        let source_call = Term::app(fun_term.clone(), vec![ty_list.clone(), val_list.clone()]);

        let mut assms = vec![(
            FINTERP_ASSM.to_string(),
            fun_interp_single_wf(a, fun_decl_term(f)?, fun_term),
        )];
        let closed_labels: Vec<String> = (0..tvs.len()).map(|i| format!("closed{i}")).collect();
        for (label, t) in closed_labels.iter().zip(&tvs) {
            assms.push((label.clone(), closed(t.clone())));
        }
        let tyvar = |name: &str| {
            f.type_params
                .iter()
                .position(|tv| tv == name)
                .map(|i| tvs[i].clone())
        };
        let mut type_of_arg = Vec::new();
        for (i, ((_, ty), v)) in f.params.iter().zip(&values).enumerate() {
            if !ty.is_primitive() {
                let label = format!("typeOfArg{i}");
                assms.push((
                    label.clone(),
                    Term::eq(type_of_val(a, v.clone()), ty_term(ty, &tyvar)?),
                ));
                type_of_arg.push(label);
            }
        }

        let conclusion = Term::eq(source_call.clone(), some(construct_value(vc_call, &f.ret)));

        let z = namer.get_name(&FunSlot::Fixed("z"), "z");
        let witness = Term::eq(
            source_call,
            some(construct_value(Term::ident(z.as_str()), &f.ret)),
        );
        let type_of_arg_refs = type_of_arg.join(" ");
        let mut methods = vec![
            "proof -".to_string(),
            format!(
                "{} obtain {z} where W: {}",
                words(["from", type_of_arg_refs.as_str(), FINTERP_ASSM]),
                quoted(&witness)
            ),
            "  apply (simp only: fun_interp_single_wf.simps)".to_string(),
            format!("  apply (erule allE[where ?x={}])", quoted(&ty_list)),
            if closed_labels.is_empty() {
                "  apply simp".to_string()
            } else {
                format!("  apply (simp add: {})", closed_labels.join(" "))
            },
            format!("  apply (erule allE[where ?x={}])", quoted(&val_list)),
            words([
                match f.ret {
                    Ty::Bool => "using tbool_boolv",
                    Ty::Int => "using tint_intv",
                    _ => "",
                },
                "by auto",
            ]),
        ];

        let mut extractor_steps = Vec::new();
        let mut explicit_facts = Vec::new();
        for (i, tv) in f.type_params.iter().enumerate() {
            if f.is_implicit(tv) {
                let ext = self.extractor(f, tv, &values)?;
                let lead = if extractor_steps.is_empty() {
                    "from"
                } else {
                    "moreover from"
                };
                let fact = Term::eq(tvs[i].clone(), closed_to_ty(ext));
                extractor_steps.push(format!(
                    "{} have {} using closed_inv2 closed{i} by auto",
                    words([lead, type_of_arg_refs.as_str()]),
                    quoted(&fact)
                ));
            } else {
                explicit_facts.push(format!("closed_inv2_2[OF closed{i}]"));
            }
        }
        let lead = if extractor_steps.len() > 1 {
            "ultimately"
        } else {
            "from this"
        };
        methods.extend(extractor_steps);
        let using = if type_of_arg.is_empty() {
            String::new()
        } else {
            format!(
                "using {}",
                words(type_of_arg.iter().chain(&explicit_facts).map(String::as_str))
            )
        };
        methods.push(words([lead, "show ?thesis", using.as_str()]));
        methods.push("by (simp add: W) qed".to_string());

        Ok(LemmaDecl::with_context(
            corres_lemma_name(f),
            ContextElem::with_assumptions(assms),
            conclusion,
            Proof::new(methods),
        ))
    }

    /// Constructor-value support for the constructor axioms of the VC.
    fn ctor_decls(&self) -> Result<Vec<OuterDecl>> {
        let ctor = Term::ident(CTOR);
        let mut equations = Vec::new();
        let mut entries = Vec::new();
        let mut lemmas = Vec::new();

        for ax in &self.vc.axioms {
            match &ax.kind {
                VcAxiomKind::CtorBasic { ty, ctor_value } => {
                    let ty_term = prim_closed_ty(ty)
                        .ok_or_else(|| ProofGenError::UnsupportedCtorType { ty: ty.to_string() })?;
                    equations.push(Equation {
                        lhs: vec![ty_term.clone()],
                        rhs: Term::int(*ctor_value),
                    });
                    lemmas.push(LemmaDecl::new(
                        ctor_lemma_name(&ty.to_string()),
                        Term::eq(Term::app(ctor.clone(), vec![ty_term]), Term::int(*ctor_value)),
                        Proof::by("simp"),
                    ));
                }
                VcAxiomKind::CtorDecl { decl, ctor_value } => {
                    entries.push(Term::tuple(vec![
                        Term::string(decl.name.as_str()),
                        Term::int(*ctor_value),
                    ]));
                    lemmas.push(Self::ctor_decl_lemma(&ctor, decl, *ctor_value));
                }
                _ => {}
            }
        }

        equations.push(Equation {
            lhs: vec![Term::ident("(TConC s _)")],
            rhs: the(map_of(Term::ident(CTOR_TABLE), Term::ident("s"))),
        });

        let mut out = vec![
            OuterDecl::Def(DefDecl {
                name: CTOR_TABLE.to_string(),
                equation: Equation {
                    lhs: Vec::new(),
                    rhs: Term::list(entries),
                },
            }),
            OuterDecl::Fun(FunDecl {
                name: CTOR.to_string(),
                ty: Some(Type::arrow(Type::data("closed_ty", vec![]), Type::int())),
                equations,
            }),
        ];
        out.extend(lemmas.into_iter().map(OuterDecl::Lemma));
        Ok(out)
    }

    /// `∀t1 .. tn. ctor (TConC ''name'' [t1, .., tn]) = value`
    fn ctor_decl_lemma(ctor: &TermRef, decl: &TypeCtorDecl, value: i64) -> LemmaDecl {
        let ids: Vec<Ident> = (1..=decl.arity).map(|i| Ident::new(format!("t{i}"))).collect();
        let applied = Term::call(
            "TConC",
            vec![
                Term::string(decl.name.as_str()),
                Term::list(ids.iter().map(Term::from_ident).collect()),
            ],
        );
        let body = Term::eq(Term::app(ctor.clone(), vec![applied]), Term::int(value));
        let statement = if ids.is_empty() {
            body
        } else {
            Term::forall(ids, body)
        };
        LemmaDecl::new(
            ctor_lemma_name(&decl.name),
            statement,
            Proof::by(format!("(simp add: {CTOR_TABLE}_def)")),
        )
    }

    /// Source names of the VC mapped to the universally quantified
    /// identifiers of the hypothesis, with their types.
    fn vc_decl_mapping(&self) -> (BTreeMap<Ident, TermRef>, Vec<Ident>, Vec<Type>) {
        let mut namer = UniqueNamer::new();
        let mut subst = BTreeMap::new();
        let mut ids = Vec::new();
        let mut types = Vec::new();

        for v in self.program.params_and_locals() {
            let id = Ident::new(namer.get_name(&VcDecl::Var(v.id), &v.name));
            subst.insert(Ident::new(v.name.as_str()), Term::from_ident(&id));
            ids.push(id);
            types.push(pure_type(&v.ty));
        }
        for f in &self.program.functions {
            let id = Ident::new(
                namer.get_name(&VcDecl::Function(f.name.clone()), &format!("vc_{}", f.name)),
            );
            subst.insert(Ident::new(f.name.as_str()), Term::from_ident(&id));
            ids.push(id);
            types.push(pure_fun_type(f));
        }
        for (renamed, orig) in &self.renamed {
            if let Some(t) = subst.get(&Ident::new(orig.as_str())).cloned() {
                subst.entry(Ident::new(renamed.as_str())).or_insert(t);
            }
        }
        (subst, ids, types)
    }

    fn final_lemma(&self) -> Result<LemmaDecl> {
        let a = &self.ctx.abs_val_ty_map;
        let (subst, ids, types) = self.vc_decl_mapping();

        let vc_body = self
            .vc
            .axioms
            .iter()
            .rev()
            .fold(IdentSubst::apply(&subst, &self.vc.vc), |acc, ax| {
                Term::meta_imp(ax.hypothesis(&subst), acc)
            });
        let vc_assm = if ids.is_empty() {
            vc_body
        } else {
            Term::meta_all(ids, types, vc_body)
        };

        let params_and_locals = self.accessor.params_and_locals_decl();
        let typed_init = Term::typed(
            self.init_state.clone(),
            Type::data("nstate", vec![Type::var("a")]),
        );
        let entry_label = self
            .cfg
            .unique_int_label(self.cfg.entry)
            .ok_or(CfgError::UnknownBlock(self.cfg.entry))?;
        let red_ctx = SemanticsContext {
            var_context: Term::tuple(vec![empty_list(), params_and_locals.clone()]),
            ..self.ctx.clone()
        };

        let assms = vec![
            (VC_ASSM.to_string(), vc_assm),
            (CLOSED_ASSM.to_string(), closedness_assumption(a)),
            (NON_EMPTY_TYPES_ASSM.to_string(), non_empty_types_assumption(a)),
            (
                FINTERP_ASSM.to_string(),
                fun_interp_wf(a, self.accessor.functions_decl(), &self.ctx.fun_context),
            ),
            (
                AXIOMS_ASSM.to_string(),
                axiom_assm(
                    &self.ctx,
                    Term::tuple(vec![empty_list(), empty_list()]),
                    self.accessor.axioms_decl(),
                    typed_init,
                ),
            ),
            (
                PARAMS_LOCAL_ASSM.to_string(),
                state_typ_wf(
                    &self.ctx,
                    params_and_locals,
                    local_state(self.init_state.clone()),
                ),
            ),
            (
                RED_ASSM.to_string(),
                red_cfg_multi(
                    &red_ctx,
                    red_ctx.var_context.clone(),
                    self.accessor.cfg_decl(),
                    cfg_config_node(Term::nat(entry_label), normal(self.init_state.clone())),
                    Term::tuple(vec![self.final_node.clone(), self.final_state.clone()]),
                ),
            ),
        ];

        Ok(LemmaDecl::with_context(
            END_TO_END_LEMMA,
            ContextElem::with_assumptions(assms),
            self.conclusion(),
            Proof::new(self.final_script()?),
        ))
    }

    fn conclusion(&self) -> TermRef {
        Term::neq(self.final_state.clone(), failure())
    }

    fn state_corres_names(&self) -> BTreeMap<u32, String> {
        let mut namer = UniqueNamer::new();
        self.program
            .params_and_locals()
            .map(|v| (v.id, format!("sc_{}", namer.get_name(&v.id, &v.name))))
            .collect()
    }

    fn final_script(&self) -> Result<Vec<String>> {
        let a = &self.ctx.abs_val_ty_map;
        let gamma = &self.ctx.fun_context;
        let sc_names = self.state_corres_names();
        let mut lines = vec![
            "proof -".to_string(),
            format!(
                "let {VAR_CONTEXT_ABBREV} = {}",
                quoted(&Term::tuple(vec![
                    empty_list(),
                    self.accessor.params_and_locals_decl()
                ]))
            ),
        ];

        for f in &self.program.functions {
            let name = Term::string(f.name.as_str());
            let abbrev = format!("?{}", f.name);
            let mem = self.accessor.membership_lemma(&f.key())?;
            lines.push(format!(
                "let {abbrev} = {}",
                quoted(&Term::app(
                    Term::ident("opaque_comp"),
                    vec![Term::ident("the"), gamma.clone(), name.clone()]
                ))
            ));
            lines.push(format!(
                "have {}: {}",
                interp_mem_name(f),
                quoted(&Term::eq(
                    Term::app(gamma.clone(), vec![name]),
                    some(Term::ident(abbrev.as_str()))
                ))
            ));
            lines.push("apply (simp only: opaque_comp_def)".to_string());
            lines.push(format!("by (rule finterp_member[OF {FINTERP_ASSM} {mem}])"));
        }

        for v in self.program.params_and_locals() {
            let mem = self.accessor.membership_lemma(&v.key())?;
            let eval = lookup_var(
                Term::ident(VAR_CONTEXT_ABBREV),
                self.init_state.clone(),
                Term::nat(u64::from(v.id)),
            );
            let fact = Term::and(
                Term::eq(eval.clone(), normalized_lookup(eval.clone(), &v.ty)),
                Term::eq(type_of_val(a, the(eval)), var_decl_term(v)?),
            );
            lines.push(format!(
                "from {PARAMS_LOCAL_ASSM} have {}: {}",
                sc_names[&v.id],
                quoted(&fact)
            ));
            lines.push("apply (simp only: state_typ_wf_def)".to_string());
            lines.push(format!(
                "apply (erule allE, erule allE, erule impE, rule {mem})"
            ));
            lines.push(format!("apply (subst lookup_var_local[OF {mem}])+"));
            lines.push("by (fastforce dest: tint_intv tbool_boolv)".to_string());
        }

        for ax in &self.program.axioms {
            let mem = self.accessor.membership_lemma(&ax.key())?;
            let evaluates = red_expr(
                &self.ctx,
                ax.term.clone(),
                self.init_state.clone(),
                bool_val(true),
            );
            lines.push(format!("have ea_{}: {}", ax.index, quoted(&evaluates)));
            lines.push(format!(
                "by (rule axioms_sat_mem[OF {mem} {AXIOMS_ASSM}])"
            ));
        }

        lines.push(format!("show {}", quoted(&self.conclusion())));
        lines.push(format!(
            "apply (rule {}.method_verifies[OF _ {RED_ASSM}])",
            self.locale
        ));
        lines.push(format!("apply (simp only: {}_def)", self.locale));
        lines.push("apply (intro conjI)".to_string());

        for f in &self.program.functions {
            let mem = self.accessor.membership_lemma(&f.key())?;
            lines.push(format!("apply (simp add: {})", interp_mem_name(f)));
            lines.push("apply (rule+)".to_string());
            lines.push(format!(
                "apply (tactic \\<open>vc_fun_corres_tac @{{context}} @{{thm {}}} @{{thm {FINTERP_ASSM}}} @{{thm {mem}}} @{{thm {}}} 1\\<close>)",
                corres_lemma_name(f),
                interp_mem_name(f)
            ));
        }

        for v in self.program.params_and_locals() {
            let sc = &sc_names[&v.id];
            if v.ty.is_primitive() {
                lines.push(format!("apply (rule HOL.conjunct1[OF {sc}])"));
            } else {
                lines.push(format!(
                    "apply (rule HOL.conjunct1[OF {sc}], rule HOL.conjunct2[OF {sc}])"
                ));
            }
        }

        lines.push(format!("apply (simp add: {CLOSED_ASSM})"));
        lines.push(format!("apply (rule {VC_ASSM})"));
        lines.extend(self.vc_axiom_steps_with(&sc_names)?);
        lines.push("done".to_string());
        lines.push("qed".to_string());
        Ok(lines)
    }

    /// Discharge steps for the VC-side axioms, one group per axiom.
    pub fn vc_axiom_steps(&self) -> Result<Vec<String>> {
        self.vc_axiom_steps_with(&self.state_corres_names())
    }

    fn vc_axiom_steps_with(&self, sc_names: &BTreeMap<u32, String>) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for ax in &self.vc.axioms {
            let step = match &ax.kind {
                VcAxiomKind::SourceAxiom => {
                    return Err(ProofGenError::UnsupportedAxiom {
                        name: ax.name.clone(),
                        kind: ax.kind.describe(),
                    });
                }
                VcAxiomKind::FunctionOutput { function } => {
                    let f = self.function(function)?;
                    let mem = self.accessor.membership_lemma(&f.key())?;
                    format!(
                        "apply (fun_output_axiom NonEmptyTypes: {NON_EMPTY_TYPES_ASSM})\n\
                         using closed_inv1 finterp_extract_2[OF {FINTERP_ASSM} {mem} {}] apply simp",
                        interp_mem_name(f)
                    )
                }
                VcAxiomKind::Var { vc_var } => {
                    let v = self.vc_variable(vc_var)?;
                    format!("apply (simp add: HOL.conjunct2[OF {}])", sc_names[&v.id])
                }
                VcAxiomKind::CtorBasic { ty, .. } => {
                    if !ty.is_primitive() {
                        return Err(ProofGenError::UnsupportedCtorType { ty: ty.to_string() });
                    }
                    format!("apply (rule {})", ctor_lemma_name(&ty.to_string()))
                }
                VcAxiomKind::CtorDecl { decl, .. } => {
                    format!("apply (rule {})", ctor_lemma_name(&decl.name))
                }
                VcAxiomKind::LeftInverse {
                    decl,
                    projected_idx,
                } => format!(
                    "apply (rule {})",
                    left_inv_lemma_name(*projected_idx, decl.arity)
                ),
                VcAxiomKind::Cast { ty, kind } => {
                    let prefix = match ty {
                        Ty::Bool => "bool",
                        Ty::Int => "int",
                        _ => return Err(ProofGenError::UnsupportedCast { ty: ty.to_string() }),
                    };
                    let rule = match kind {
                        CastKind::BoxedOfUnboxed => "inverse_1",
                        CastKind::UnboxedOfBoxed => "inverse_2",
                        CastKind::TypeOfBoxed => "type",
                    };
                    format!("apply (rule {prefix}_{rule})")
                }
            };
            lines.push(format!("unfolding {}_def", ax.name));
            lines.extend(step.lines().map(str::to_string));
        }
        Ok(lines)
    }
}
