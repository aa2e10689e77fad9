/* Utilities that are reused for testing */
use sfout::{Dataset, MemOutput};

pub const FSAB_FLOW: f64 = -0.19232736224836933;
pub const HEAT_FLUX: f64 = 1.07006912605345766E-007;

/// Compare doubles `A` and `B` within fractional tolerance `tol` of the larger
pub fn double_comparable(a: f64, b: f64, tol: f64) -> bool {
    if !a.is_finite() || !b.is_finite()  { return false; }
    
    let diff = (a-b).abs();
    let largest = a.abs().max(b.abs());
    
    diff <= largest * tol
}

/// A one species, two iteration output shaped like SFINCS writes it
/// (iterations x species), with the given first-iteration values
pub fn sfincs_output(flow: f64, heat_flux: f64) -> MemOutput {
    MemOutput::new("test output")
        .with("FSABFlow", Dataset::new(vec![2, 1], vec![flow, 0.0]).unwrap())
        .with("heatFlux_vm_psiHat", Dataset::new(vec![2, 1], vec![heat_flux, 0.0]).unwrap())
        .with("Nspecies", Dataset::scalar(1.0))
}

/// `sfincs_output` with the values the tokamak example is expected to produce
pub fn expected_output() -> MemOutput {
    sfincs_output(FSAB_FLOW, HEAT_FLUX)
}
