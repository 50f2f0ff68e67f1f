#![forbid(unsafe_code)]

//! Deterministic debug rendering.
//!
//! Discharge scripts embed terms as text, so every term needs a stable
//! rendering. It follows the usual HOL surface syntax but makes no promise
//! to be accepted verbatim by a particular prover front end.

use std::fmt;
use std::rc::Rc;

use crate::decl::{ContextElem, DefDecl, Equation, FunDecl, LemmaDecl, OuterDecl, Proof};
use crate::term::{Ident, Literal, NAryOp, QuantKind, Term, TermRef};
use crate::ty::{PrimType, Type};
use crate::visit::{OuterDeclVisitor, TermVisitor, TypeVisitor};

pub struct TermRenderer;

impl TermRenderer {
    pub fn render(t: &TermRef) -> String {
        TermRenderer.visit(t)
    }

    fn operand(&mut self, t: &TermRef) -> String {
        if t.is_atomic() {
            self.visit(t)
        } else {
            format!("({})", self.visit(t))
        }
    }

    fn joined(&mut self, items: &[TermRef], sep: &str) -> String {
        self.visit_all(items).join(sep)
    }
}

fn op_symbol(op: NAryOp) -> &'static str {
    match op {
        NAryOp::Eq => "=",
        NAryOp::Neq => "\\<noteq>",
        NAryOp::Lt => "<",
        NAryOp::Le => "\\<le>",
        NAryOp::Gt => ">",
        NAryOp::Ge => "\\<ge>",
        NAryOp::And => "\\<and>",
        NAryOp::Or => "\\<or>",
        NAryOp::Implies => "\\<longrightarrow>",
        NAryOp::MetaImp => "\\<Longrightarrow>",
        NAryOp::Add => "+",
        NAryOp::Sub => "-",
        NAryOp::Elem => "\\<in>",
        NAryOp::Inter => "\\<inter>",
        NAryOp::Append => "@",
        NAryOp::Compose => "\\<circ>",
    }
}

fn quant_symbol(kind: QuantKind) -> &'static str {
    match kind {
        QuantKind::ForAll => "\\<forall>",
        QuantKind::Exists => "\\<exists>",
        QuantKind::MetaAll => "\\<And>",
        QuantKind::Lambda => "\\<lambda>",
    }
}

impl TermVisitor for TermRenderer {
    type Output = String;

    fn visit_app(&mut self, _t: &TermRef, head: &TermRef, args: &[TermRef]) -> String {
        let mut out = self.operand(head);
        for a in args {
            out.push(' ');
            out.push_str(&self.operand(a));
        }
        out
    }

    fn visit_list(&mut self, _t: &TermRef, items: &[TermRef]) -> String {
        format!("[{}]", self.joined(items, ", "))
    }

    fn visit_set(&mut self, _t: &TermRef, items: &[TermRef]) -> String {
        format!("{{{}}}", self.joined(items, ", "))
    }

    fn visit_record(&mut self, _t: &TermRef, fields: &[(Ident, TermRef)]) -> String {
        let fields: Vec<String> = fields
            .iter()
            .map(|(k, v)| format!("{} = {}", k.as_str(), self.visit(v)))
            .collect();
        format!("\\<lparr>{}\\<rparr>", fields.join(", "))
    }

    fn visit_tuple(&mut self, _t: &TermRef, items: &[TermRef]) -> String {
        format!("({})", self.joined(items, ", "))
    }

    fn visit_ident(&mut self, _t: &TermRef, id: &Ident) -> String {
        id.as_str().to_string()
    }

    fn visit_nary(&mut self, _t: &TermRef, op: NAryOp, args: &[TermRef]) -> String {
        let parts: Vec<String> = args.iter().map(|a| self.operand(a)).collect();
        parts.join(&format!(" {} ", op_symbol(op)))
    }

    fn visit_quantifier(
        &mut self,
        _t: &TermRef,
        kind: QuantKind,
        bound: &[Ident],
        types: Option<&[Type]>,
        body: &TermRef,
    ) -> String {
        let binders: Vec<String> = match types {
            Some(types) => bound
                .iter()
                .zip(types)
                .map(|(id, ty)| format!("({}::{})", id.as_str(), TypeRenderer.visit_type(ty)))
                .collect(),
            None => bound.iter().map(|id| id.as_str().to_string()).collect(),
        };
        format!("{}{}. {}", quant_symbol(kind), binders.join(" "), self.visit(body))
    }

    fn visit_case_of(&mut self, _t: &TermRef, scrutinee: &TermRef, arms: &[(TermRef, TermRef)]) -> String {
        let arms: Vec<String> = arms
            .iter()
            .map(|(pat, rhs)| format!("{} \\<Rightarrow> {}", self.visit(pat), self.visit(rhs)))
            .collect();
        format!("case {} of {}", self.visit(scrutinee), arms.join(" | "))
    }

    fn visit_typed(&mut self, _t: &TermRef, term: &TermRef, ty: &Type) -> String {
        format!("({}::{})", self.visit(term), TypeRenderer.visit_type(ty))
    }

    fn visit_lit(&mut self, _t: &TermRef, lit: &Literal) -> String {
        match lit {
            Literal::Bool(true) => "True".to_string(),
            Literal::Bool(false) => "False".to_string(),
            Literal::Nat(n) => n.to_string(),
            Literal::Int(n) if *n < 0 => format!("(-{}::int)", n.unsigned_abs()),
            Literal::Int(n) => format!("({n}::int)"),
            Literal::Str(s) => format!("''{s}''"),
        }
    }
}

pub struct TypeRenderer;

impl TypeRenderer {
    fn operand(&mut self, t: &Type) -> String {
        match t {
            Type::Arrow(..) | Type::Tuple(_) => format!("({})", self.visit_type(t)),
            _ => self.visit_type(t),
        }
    }
}

impl TypeVisitor for TypeRenderer {
    type Output = String;

    fn visit_tuple_type(&mut self, items: &[Type]) -> String {
        let parts: Vec<String> = items.iter().map(|t| self.operand(t)).collect();
        parts.join(" \\<times> ")
    }

    fn visit_arrow_type(&mut self, from: &Type, to: &Type) -> String {
        format!("{} \\<Rightarrow> {}", self.operand(from), self.visit_type(to))
    }

    fn visit_data_type(&mut self, name: &str, args: &[Type]) -> String {
        match args {
            [] => name.to_string(),
            [single] => format!("{} {name}", self.operand(single)),
            _ => {
                let parts: Vec<String> = args.iter().map(|t| self.visit_type(t)).collect();
                format!("({}) {name}", parts.join(", "))
            }
        }
    }

    fn visit_primitive_type(&mut self, p: PrimType) -> String {
        match p {
            PrimType::Bool => "bool",
            PrimType::Int => "int",
            PrimType::Nat => "nat",
            PrimType::String => "string",
            PrimType::Unit => "unit",
        }
        .to_string()
    }

    fn visit_type_var(&mut self, name: &str) -> String {
        format!("'{name}")
    }
}

pub struct DeclRenderer;

fn quoted(t: &TermRef) -> String {
    format!("\"{}\"", TermRenderer::render(t))
}

fn render_equation(name: &str, eq: &Equation) -> String {
    let lhs = if eq.lhs.is_empty() {
        Term::ident(name)
    } else {
        Term::app(Term::ident(name), eq.lhs.clone())
    };
    quoted(&Term::eq(lhs, Rc::clone(&eq.rhs)))
}

fn render_context(ctx: &ContextElem) -> String {
    if ctx.assumptions.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = ctx
        .assumptions
        .iter()
        .map(|(label, t)| format!("{label}: {}", quoted(t)))
        .collect();
    format!("assumes {}\n", parts.join(" and\n  "))
}

fn render_proof(p: &Proof) -> String {
    p.methods.join("\n")
}

impl OuterDeclVisitor for DeclRenderer {
    type Output = String;

    fn visit_fun_decl(&mut self, f: &FunDecl) -> String {
        let sig = match &f.ty {
            Some(ty) => format!("fun {} :: \"{}\" where\n", f.name, TypeRenderer.visit_type(ty)),
            None => format!("fun {} where\n", f.name),
        };
        let eqs: Vec<String> = f
            .equations
            .iter()
            .map(|eq| render_equation(&f.name, eq))
            .collect();
        format!("{sig}  {}", eqs.join("\n| "))
    }

    fn visit_def_decl(&mut self, d: &DefDecl) -> String {
        format!(
            "definition {} where\n  {}",
            d.name,
            render_equation(&d.name, &d.equation)
        )
    }

    fn visit_lemma_decl(&mut self, l: &LemmaDecl) -> String {
        let stmt = quoted(&l.statement);
        if l.context.assumptions.is_empty() {
            format!("lemma {}:\n{stmt}\n{}", l.name, render_proof(&l.proof))
        } else {
            format!(
                "lemma {}:\n{}shows {stmt}\n{}",
                l.name,
                render_context(&l.context),
                render_proof(&l.proof)
            )
        }
    }

    fn visit_declare(&mut self, attr: &str) -> String {
        format!("declare {attr}")
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&TermRenderer::render(&Rc::new(self.clone())))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&TypeRenderer.visit_type(self))
    }
}

impl fmt::Display for OuterDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&DeclRenderer.visit_decl(self))
    }
}
