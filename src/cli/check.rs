use std::{collections::BTreeMap, path::PathBuf, time::Duration};

use serde::Serialize;
use structopt::StructOpt;

use crate::{
    errors::{Diagnostic, SolverResult},
    problem::Problem,
    typing::{Session, Solver, SolverOptions, Subst, Ty},
};

#[derive(Debug, StructOpt)]
pub struct CheckOptions {
    #[structopt(name = "INPUT", parse(from_os_str), help = "problem file (JSON)")]
    pub input_path: PathBuf,

    #[structopt(
        long,
        help = "Maximum number of alternatives a solve tries before giving up",
        default_value = "4096"
    )]
    pub max_clauses: usize,

    #[structopt(long, help = "Removes the limit on alternatives tried")]
    pub no_clause_limit: bool,

    #[structopt(
        long,
        help = "Seconds allowed for re-solving failed constraints, 0 for no limit",
        default_value = "10"
    )]
    pub time_limit: u64,

    #[structopt(
        long,
        help = "Solves each constraint as its own expression, retrying failures at the end"
    )]
    pub individual: bool,

    #[structopt(long, help = "Prints the result as JSON")]
    pub json: bool,
}

impl CheckOptions {
    pub fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            max_clauses: if self.no_clause_limit {
                None
            } else {
                Some(self.max_clauses)
            },
            time_limit: if self.time_limit == 0 {
                None
            } else {
                Some(Duration::from_secs(self.time_limit))
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    ok: bool,
    subst: BTreeMap<String, String>,
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    fn new(ok: bool, subst: &Subst, diagnostics: Vec<Diagnostic>) -> Report {
        let subst = subst
            .keys()
            .map(|var| (var.to_string(), subst.resolve(&Ty::Var(var.clone())).to_string()))
            .collect();
        Report {
            ok,
            subst,
            diagnostics,
        }
    }
}

pub(super) fn action(options: CheckOptions) -> SolverResult<bool> {
    let problem = Problem::load(&options.input_path)?;
    let registry = problem.registry()?;
    let constraints = problem.constraints()?;
    let solver = Solver::with_options(&registry, options.solver_options());
    log::info!(
        "checking {} constraint(s) against {} type(s)",
        constraints.len(),
        registry.len()
    );

    let (ok, subst, diagnostics) = if options.individual {
        let mut session = Session::new(&solver);
        for c in constraints {
            session.solve(vec![c])?;
        }
        let result = session.finish()?;
        (result.is_ok(), result.subst, result.diagnostics)
    } else {
        let mut subst = Subst::new();
        let mut diagnostics = vec![];
        let ok = solver.try_solve(constraints, &mut diagnostics, &mut subst)?;
        (ok, subst, diagnostics)
    };

    let report = Report::new(ok, &subst, diagnostics);
    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if ok {
        for (var, ty) in report.subst.iter() {
            println!("{} = {}", var, ty);
        }
    } else {
        for diag in report.diagnostics.iter() {
            diag.emit();
        }
    }
    Ok(ok)
}
