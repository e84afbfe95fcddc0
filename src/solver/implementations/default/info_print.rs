use super::*;
use crate::algebra::*;
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::solver::core::bnb::NodeReport;
use crate::solver::core::{traits::InfoPrint, SolverStatus};
use std::io::Write;
use std::time::Duration;

impl<T> ConfigurablePrintTarget for DefaultInfo<T> {
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_sink(&mut self) {
        self.stream.print_to_sink()
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}

macro_rules! expformat {
    ($fmt:expr,$val:expr) => {
        if $val.is_finite() {
            _exp_str_reformat(format!($fmt, $val))
        } else {
            format!($fmt, $val)
        }
    };
}

const RULE: &str = "-----------------------------------------------------------";

impl<T> InfoPrint<T> for DefaultInfo<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type SE = DefaultSettings<T>;

    fn print_configuration(
        &mut self,
        settings: &DefaultSettings<T>,
        data: &DefaultProblemData<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        print_banner(&mut self.stream)?;

        let out = &mut self.stream;
        let n_eq = data
            .blower
            .iter()
            .zip(data.bupper.iter())
            .filter(|(l, u)| l == u)
            .count();

        writeln!(out, "problem:")?;
        writeln!(out, "  variables     = {}", data.n)?;
        writeln!(out, "  constraints   = {}", data.m)?;
        writeln!(out, "  equalities    = {}", n_eq)?;
        writeln!(out, "  binaries      = {}", data.bin_ids.len())?;
        writeln!(out, "  soft          = {}", data.soft_ids.len())?;
        writeln!(out,)?;

        let has_binaries = !data.bin_ids.is_empty();
        let has_soft = !data.soft_ids.is_empty();
        self.print_settings(settings, has_binaries, has_soft)?;

        std::io::Result::Ok(())
    }

    fn print_node(
        &mut self,
        settings: &DefaultSettings<T>,
        node: &NodeReport<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        // the root opens a fresh table
        if node.id == 0 {
            writeln!(out, " node  depth  status             objective     incumbent")?;
            writeln!(out, "{RULE}")?;
        }

        write!(out, "{:>5}  {:>5}  ", node.id, node.depth)?;
        write!(out, "{:<17}  ", node.status.to_string())?;
        write!(out, "{}  ", _opt_exp_str(node.objective))?;
        write!(out, "{}", _opt_exp_str(node.incumbent))?;
        writeln!(out,)?;

        std::io::Result::Ok(())
    }

    fn print_level(
        &mut self,
        settings: &DefaultSettings<T>,
        level: usize,
        limit: usize,
        status: SolverStatus,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }
        writeln!(
            self.stream,
            "level {:>3}: constraints < {:<6} status = {}",
            level, limit, status
        )
    }

    fn print_footer(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        writeln!(out, "{RULE}")?;
        writeln!(out, "Terminated with status = {}", self.status)?;
        writeln!(out, "  iterations = {}", self.iterations)?;
        if self.nodes > 0 {
            writeln!(out, "  nodes      = {}", self.nodes)?;
        }
        writeln!(out, "  objective  = {}", expformat!("{:+.6e}", self.obj_val))?;
        writeln!(
            out,
            "setup time = {:?}, solve time = {:?}",
            Duration::from_secs_f64(self.setup_time),
            Duration::from_secs_f64(self.solve_time)
        )?;
        out.flush()?;

        std::io::Result::Ok(())
    }
}

impl<T> DefaultInfo<T>
where
    T: FloatT,
{
    fn print_settings(
        &mut self,
        settings: &DefaultSettings<T>,
        has_binaries: bool,
        has_soft: bool,
    ) -> std::io::Result<()> {
        let out = &mut self.stream;
        let set = settings;

        writeln!(out, "settings:")?;
        writeln!(
            out,
            "  precision: {} bit, max iter = {}",
            _get_precision_string::<T>(),
            set.max_iter
        )?;
        writeln!(
            out,
            "  primal_tol = {:.1e}, dual_tol = {:.1e}, zero_tol = {:.1e}",
            set.primal_tol, set.dual_tol, set.zero_tol
        )?;

        let bound_str = {
            if set.fval_bound.is_infinite() {
                "Inf".to_string()
            } else {
                expformat!("{:.3e}", set.fval_bound)
            }
        };
        writeln!(out, "  objective bound = {bound_str}")?;

        if has_soft {
            writeln!(out, "  soft constraints: rho = {:.1e}", set.rho_soft)?;
        }
        if set.eps_prox > T::zero() {
            writeln!(
                out,
                "  proximal point: eps = {:.1e}, eta = {:.1e}",
                set.eps_prox, set.eta_prox
            )?;
        }

        if has_binaries {
            writeln!(
                out,
                "  branch-and-bound: {} / {}, max nodes = {}, int_tol = {:.1e}",
                set.branching_rule, set.node_selection, set.max_nodes, set.int_tol
            )?;
        }
        writeln!(out,)?;

        std::io::Result::Ok(())
    }
}

fn print_banner(out: &mut PrintTarget) -> std::io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "        DAQP.rs v{}  -  dual active-set QP solver\n",
        crate::VERSION
    )?;
    writeln!(out, "{RULE}")
}

fn _opt_exp_str<T: FloatT>(val: Option<T>) -> String {
    match val {
        Some(v) => format!("{:>12}", expformat!("{:+.4e}", v)),
        None => format!("{:>12}", "------"),
    }
}

fn _get_precision_string<T: FloatT>() -> String {
    (::std::mem::size_of::<T>() * 8).to_string()
}

// convert a string in LowerExp display format into one that
// 1) always has a sign after the exponent, and
// 2) has at least two digits in the exponent.
fn _exp_str_reformat(mut thestr: String) -> String {
    let Some(eidx) = thestr.find('e') else {
        return thestr;
    };
    let has_sign = thestr[eidx + 1..].starts_with('-');
    let exp_digits = thestr.len() - eidx - if has_sign { 2 } else { 1 };

    let chars = match (has_sign, exp_digits < 2) {
        (false, true) => "+0",
        (false, false) => "+",
        (true, true) => "0",
        (true, false) => "",
    };

    let shift = if has_sign { 2 } else { 1 };
    thestr.insert_str(eidx + shift, chars);
    thestr
}

#[test]
fn test_exp_str_reformat() {
    assert_eq!(_exp_str_reformat("1.5e3".to_string()), "1.5e+03");
    assert_eq!(_exp_str_reformat("-2.0e-7".to_string()), "-2.0e-07");
    assert_eq!(_exp_str_reformat("1.0e-12".to_string()), "1.0e-12");
    assert_eq!(_exp_str_reformat("inf".to_string()), "inf");
    assert_eq!(_opt_exp_str::<f64>(None).trim(), "------");
}
