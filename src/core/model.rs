//! Model variants: analytical GMF or pre-tabulated LUT

use crate::core::dispatch::evaluate_scalar;
use crate::core::gmf::GmfDescriptor;
use crate::core::interp::interp_point;
use crate::core::lut_builder::{build_gmf_lut, LutRequest};
use crate::types::{db_to_linear, AxisRange, Lut, Polarization, Units, WindError, WindResult};
use ndarray::{Array1, ArrayView1, Zip};

type Sampler<'a> = Box<dyn Fn(f64, f64, Option<f64>) -> f64 + Sync + 'a>;

/// Model backed by a tabulated LUT
#[derive(Debug, Clone)]
pub struct TabulatedModel {
    pub name: String,
    pub pol: Polarization,
    pub lut: Lut,
}

impl TabulatedModel {
    pub fn new(name: &str, pol: Polarization, lut: Lut) -> Self {
        Self {
            name: name.to_string(),
            pol,
            lut,
        }
    }
}

/// A registered model. Both variants deliver a LUT through [`Model::to_lut`].
#[derive(Debug, Clone)]
pub enum Model {
    Gmf(GmfDescriptor),
    Tabulated(TabulatedModel),
}

fn axis_range(axis: &Array1<f64>) -> AxisRange {
    AxisRange::new(axis[0], axis[axis.len() - 1])
}

impl Model {
    pub fn name(&self) -> &str {
        match self {
            Model::Gmf(gmf) => &gmf.name,
            Model::Tabulated(table) => &table.name,
        }
    }

    pub fn pol(&self) -> Polarization {
        match self {
            Model::Gmf(gmf) => gmf.pol,
            Model::Tabulated(table) => table.pol,
        }
    }

    pub fn is_copol(&self) -> bool {
        self.pol().is_copol()
    }

    pub fn is_crosspol(&self) -> bool {
        self.pol().is_crosspol()
    }

    pub fn inc_range(&self) -> AxisRange {
        match self {
            Model::Gmf(gmf) => gmf.inc_range,
            Model::Tabulated(table) => axis_range(table.lut.incidence()),
        }
    }

    pub fn wspd_range(&self) -> AxisRange {
        match self {
            Model::Gmf(gmf) => gmf.wspd_range,
            Model::Tabulated(table) => axis_range(table.lut.wspd()),
        }
    }

    pub fn phi_range(&self) -> Option<AxisRange> {
        match self {
            Model::Gmf(gmf) => gmf.phi_range,
            Model::Tabulated(table) => table.lut.phi().map(axis_range),
        }
    }

    /// LUT over the model valid ranges, in `units`
    pub fn to_lut(&self, units: Units) -> WindResult<Lut> {
        self.to_lut_with(&LutRequest::with_units(units))
    }

    /// LUT for a specific request. Tabulated models ignore requested ranges.
    pub fn to_lut_with(&self, request: &LutRequest) -> WindResult<Lut> {
        match self {
            Model::Gmf(gmf) => build_gmf_lut(gmf, request),
            Model::Tabulated(table) => {
                if request.inc_range.is_some() || request.wspd_range.is_some() {
                    log::debug!("Ranges ignored for tabulated model '{}'", table.name);
                }
                Ok(table.lut.clone().into_units(request.units))
            }
        }
    }

    /// Linear sigma0 at a single point.
    ///
    /// Tabulated models interpolate inside their LUT and return NaN outside of it.
    pub fn evaluate(&self, inc: f64, wspd: f64, phi: Option<f64>) -> WindResult<f64> {
        let sample = self.sampler()?;
        Ok(sample(inc, wspd, phi))
    }

    /// Linear sigma0 over 1D arrays of identical length, element by element.
    pub fn evaluate_array(
        &self,
        inc: ArrayView1<f64>,
        wspd: ArrayView1<f64>,
        phi: Option<ArrayView1<f64>>,
    ) -> WindResult<Array1<f64>> {
        let phi_len = phi.map_or(inc.len(), |p| p.len());
        if inc.len() != wspd.len() || inc.len() != phi_len {
            return Err(WindError::ShapeMismatch(format!(
                "inc {}, wspd {}, phi {}",
                inc.len(),
                wspd.len(),
                phi_len
            )));
        }
        let sample = self.sampler()?;

        Ok(match phi {
            Some(phi) => {
                let zip = Zip::from(inc).and(wspd).and(phi);
                #[cfg(feature = "parallel")]
                let values = zip.par_map_collect(|&i, &w, &p| sample(i, w, Some(p)));
                #[cfg(not(feature = "parallel"))]
                let values = zip.map_collect(|&i, &w, &p| sample(i, w, Some(p)));
                values
            }
            None => {
                let zip = Zip::from(inc).and(wspd);
                #[cfg(feature = "parallel")]
                let values = zip.par_map_collect(|&i, &w| sample(i, w, None));
                #[cfg(not(feature = "parallel"))]
                let values = zip.map_collect(|&i, &w| sample(i, w, None));
                values
            }
        })
    }

    /// Point evaluator in linear units
    fn sampler(&self) -> WindResult<Sampler<'_>> {
        let sampler: Sampler<'_> = match self {
            Model::Gmf(gmf) => {
                let kernel = gmf.kernel()?;
                Box::new(move |inc: f64, wspd: f64, phi: Option<f64>| {
                    evaluate_scalar(kernel, inc, wspd, phi)
                })
            }
            Model::Tabulated(table) => {
                let lut = &table.lut;
                Box::new(move |inc: f64, wspd: f64, phi: Option<f64>| {
                    let value = interp_point(
                        lut.values().view(),
                        lut.incidence().view(),
                        lut.wspd().view(),
                        lut.phi().map(|p| p.view()),
                        (inc, wspd, phi),
                    );
                    match lut.units() {
                        Units::Linear => value,
                        Units::Db => db_to_linear(value),
                    }
                })
            }
        };
        Ok(sampler)
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Model::Gmf(_) => "GmfModel",
            Model::Tabulated(_) => "LutModel",
        };
        write!(f, "<{}('{}') pol={}>", kind, self.name(), self.pol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gmf::{builtin_gmfs, cmod5n};
    use approx::assert_relative_eq;
    use ndarray::{array, Array3};

    fn gmf_model(name: &str) -> Model {
        Model::Gmf(builtin_gmfs().into_iter().find(|g| g.name == name).unwrap())
    }

    #[test]
    fn test_gmf_model_properties() {
        let model = gmf_model("gmf_cmod5n");
        assert!(model.is_copol());
        assert_eq!(model.phi_range(), Some(AxisRange::new(0.0, 180.0)));
        assert_relative_eq!(
            model.evaluate(30.0, 10.0, Some(45.0)).unwrap(),
            cmod5n(30.0, 10.0, 45.0)
        );
        assert_eq!(model.to_string(), "<GmfModel('gmf_cmod5n') pol=VV>");
    }

    #[test]
    fn test_kernel_unavailable_model() {
        let model = gmf_model("gmf_cmodms1ahw");
        assert!(matches!(
            model.to_lut(Units::Db),
            Err(WindError::KernelUnavailable(_))
        ));
        assert!(model.evaluate(30.0, 10.0, None).is_err());
    }

    #[test]
    fn test_tabulated_model() {
        let lut = Lut::new(
            "sarwing_lut_test",
            Units::Db,
            array![20.0, 40.0],
            array![5.0, 15.0],
            None,
            Array3::from_shape_vec((2, 2, 1), vec![-30.0, -20.0, -32.0, -22.0]).unwrap(),
        )
        .unwrap();
        let model =
            Model::Tabulated(TabulatedModel::new("sarwing_lut_test", Polarization::VH, lut));

        assert!(model.is_crosspol());
        assert_eq!(model.inc_range(), AxisRange::new(20.0, 40.0));
        assert_eq!(model.phi_range(), None);

        let linear = model.to_lut(Units::Linear).unwrap();
        assert_eq!(linear.units(), Units::Linear);
        assert_relative_eq!(linear.values()[[0, 0, 0]], 1e-3, max_relative = 1e-12);

        // midpoint of the table: -26 dB
        let value = model.evaluate(30.0, 10.0, None).unwrap();
        assert_relative_eq!(value, db_to_linear(-26.0), max_relative = 1e-12);
        assert!(model.evaluate(50.0, 10.0, None).unwrap().is_nan());
    }

    #[test]
    fn test_evaluate_array_gmf() {
        let model = gmf_model("gmf_cmod5n");
        let inc = array![25.0, 35.0, 45.0];
        let wspd = array![5.0, 10.0, 20.0];
        let phi = array![0.0, 90.0, 180.0];
        let values = model
            .evaluate_array(inc.view(), wspd.view(), Some(phi.view()))
            .unwrap();
        assert_eq!(values.len(), 3);
        for k in 0..3 {
            assert_relative_eq!(values[k], cmod5n(inc[k], wspd[k], phi[k]));
        }

        let c2po = gmf_model("gmf_c2po");
        let values = c2po.evaluate_array(inc.view(), wspd.view(), None).unwrap();
        for k in 0..3 {
            assert_relative_eq!(values[k], c2po.evaluate(inc[k], wspd[k], None).unwrap());
        }
    }

    #[test]
    fn test_evaluate_array_tabulated_and_errors() {
        let lut = Lut::new(
            "sarwing_lut_test",
            Units::Db,
            array![20.0, 40.0],
            array![5.0, 15.0],
            None,
            Array3::from_shape_vec((2, 2, 1), vec![-30.0, -20.0, -32.0, -22.0]).unwrap(),
        )
        .unwrap();
        let model =
            Model::Tabulated(TabulatedModel::new("sarwing_lut_test", Polarization::VH, lut));

        let inc = array![30.0, 50.0];
        let wspd = array![10.0, 10.0];
        let values = model.evaluate_array(inc.view(), wspd.view(), None).unwrap();
        assert_relative_eq!(values[0], db_to_linear(-26.0), max_relative = 1e-12);
        assert!(values[1].is_nan());

        let short = array![10.0];
        assert!(matches!(
            model.evaluate_array(inc.view(), short.view(), None),
            Err(WindError::ShapeMismatch(_))
        ));
        assert!(matches!(
            gmf_model("gmf_cmodms1ahw").evaluate_array(inc.view(), wspd.view(), None),
            Err(WindError::KernelUnavailable(_))
        ));
    }
}
