//! Analytical geophysical model functions (GMF)
//!
//! Every kernel maps (incidence [deg], wind speed [m/s], relative wind
//! direction [deg]) to linear sigma0. Relative direction 0 is wind blowing
//! towards the radar. Kernels are pure and safe to call from any thread.

use crate::types::{AxisRange, Polarization, WindError, WindResult};
use serde::{Deserialize, Serialize};

/// Pure GMF kernel: `sigma0_linear = kernel(incidence, wspd, phi)`
pub type GmfKernel = fn(f64, f64, f64) -> f64;

/// Immutable description of an analytical GMF
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmfDescriptor {
    pub name: String,
    pub pol: Polarization,
    /// Valid incidence range (degrees)
    pub inc_range: AxisRange,
    /// Valid wind speed range (m/s)
    pub wspd_range: AxisRange,
    /// Valid relative direction range (degrees), None for cross-pol models
    pub phi_range: Option<AxisRange>,
    #[serde(skip)]
    pub kernel: Option<GmfKernel>,
}

impl GmfDescriptor {
    /// The analytical kernel, or `KernelUnavailable` for table-only models
    pub fn kernel(&self) -> WindResult<GmfKernel> {
        self.kernel
            .ok_or_else(|| WindError::KernelUnavailable(self.name.clone()))
    }

    pub fn has_kernel(&self) -> bool {
        self.kernel.is_some()
    }

    pub fn is_copol(&self) -> bool {
        self.pol.is_copol()
    }

    pub fn is_crosspol(&self) -> bool {
        self.pol.is_crosspol()
    }
}

/// GMFs shipped with the crate
pub fn builtin_gmfs() -> Vec<GmfDescriptor> {
    let copol_inc = AxisRange::new(17.0, 50.0);
    let copol_wspd = AxisRange::new(0.2, 50.0);
    let copol_phi = Some(AxisRange::new(0.0, 180.0));

    vec![
        GmfDescriptor {
            name: "gmf_cmod5".to_string(),
            pol: Polarization::VV,
            inc_range: copol_inc,
            wspd_range: copol_wspd,
            phi_range: copol_phi,
            kernel: Some(cmod5),
        },
        GmfDescriptor {
            name: "gmf_cmod5n".to_string(),
            pol: Polarization::VV,
            inc_range: copol_inc,
            wspd_range: copol_wspd,
            phi_range: copol_phi,
            kernel: Some(cmod5n),
        },
        GmfDescriptor {
            name: "gmf_c2po".to_string(),
            pol: Polarization::VH,
            inc_range: AxisRange::new(17.0, 50.0),
            wspd_range: AxisRange::new(3.0, 50.0),
            phi_range: None,
            kernel: Some(c2po),
        },
        // Only distributed as a tabulated LUT
        GmfDescriptor {
            name: "gmf_cmodms1ahw".to_string(),
            pol: Polarization::VH,
            inc_range: AxisRange::new(17.0, 50.0),
            wspd_range: AxisRange::new(3.0, 80.0),
            phi_range: None,
            kernel: None,
        },
    ]
}

// C1..C28 (Hersbach et al., 2007)
const CMOD5_COEFFS: [f64; 28] = [
    -0.688, -0.793, 0.338, -0.173, 0.00, 0.004, 0.111, 0.0162, 6.34, 2.57, -2.18, 0.40, -0.60,
    0.045, 0.007, 0.33, 0.012, 22.0, 1.95, 3.00, 8.39, -3.44, 1.36, 5.35, 1.99, 0.29, 3.80, 1.53,
];

// C1..C28, neutral wind retune (Hersbach, 2008)
const CMOD5N_COEFFS: [f64; 28] = [
    -0.6878, -0.7957, 0.3380, -0.1728, 0.0000, 0.0040, 0.1103, 0.0159, 6.7329, 2.7713, -2.2885,
    0.4971, -0.7250, 0.0450, 0.0066, 0.3222, 0.0120, 22.7000, 2.0813, 3.0000, 8.3659, -3.3428,
    1.3236, 6.2437, 2.3893, 0.3249, 4.1590, 1.6930,
];

/// CMOD5 (VV)
pub fn cmod5(inc: f64, wspd: f64, phi: f64) -> f64 {
    cmod5_family(&CMOD5_COEFFS, inc, wspd, phi)
}

/// CMOD5.n (VV, equivalent neutral wind)
pub fn cmod5n(inc: f64, wspd: f64, phi: f64) -> f64 {
    cmod5_family(&CMOD5N_COEFFS, inc, wspd, phi)
}

fn cmod5_family(coeffs: &[f64; 28], inc: f64, wspd: f64, phi: f64) -> f64 {
    const THETM: f64 = 40.0;
    const THETHR: f64 = 25.0;
    const ZPOW: f64 = 1.6;

    // 1-based to match the published coefficient tables
    let c = |i: usize| coeffs[i - 1];

    let y0 = c(19);
    let pn = c(20);
    let a = y0 - (y0 - 1.0) / pn;
    let b = 1.0 / (pn * (y0 - 1.0).powf(pn - 1.0));

    let csfi = phi.to_radians().cos();
    let cs2fi = 2.0 * csfi * csfi - 1.0;

    let x = (inc - THETM) / THETHR;
    let xx = x * x;

    // B0: isotropic part
    let a0 = c(1) + c(2) * x + c(3) * xx + c(4) * x * xx;
    let a1 = c(5) + c(6) * x;
    let a2 = c(7) + c(8) * x;
    let gam = c(9) + c(10) * x + c(11) * xx;
    let s0 = c(12) + c(13) * x;

    let s = a2 * wspd;
    let mut a3 = 1.0 / (1.0 + (-s.max(s0)).exp());
    if s < s0 {
        a3 *= (s / s0).powf(s0 * (1.0 - a3));
    }
    let b0 = a3.powf(gam) * 10f64.powf(a0 + a1 * wspd);

    // B1: upwind/downwind
    let mut b1 = c(15) * wspd * (0.5 + x - (4.0 * (x + c(16) + c(17) * wspd)).tanh());
    b1 = c(14) * (1.0 + x) - b1;
    b1 /= (0.34 * (wspd - c(18))).exp() + 1.0;

    // B2: upwind/crosswind
    let v0 = c(21) + c(22) * x + c(23) * xx;
    let d1 = c(24) + c(25) * x + c(26) * xx;
    let d2 = c(27) + c(28) * x;

    let mut v2 = wspd / v0 + 1.0;
    if v2 < y0 {
        v2 = a + b * (v2 - 1.0).powf(pn);
    }
    let b2 = (-d1 + d2 * v2) * (-v2).exp();

    b0 * (1.0 + b1 * csfi + b2 * cs2fi).powf(ZPOW)
}

/// C-2PO cross-pol GMF (Zhang et al., 2011): linear in dB, no incidence or
/// direction dependency. `phi` is accepted for a uniform calling convention.
pub fn c2po(_inc: f64, wspd: f64, _phi: f64) -> f64 {
    let sigma0_db = 0.580 * wspd - 35.652;
    10f64.powf(sigma0_db / 10.0)
}
