//! Pick the best compute backend allowed by enabled crate features, expose it
//! as a Simulation typedef.

cfg_if::cfg_if! {
    if #[cfg(feature = "compute_banded")] {
        pub type Simulation = compute_banded::Simulation;
    } else if #[cfg(any(feature = "compute_dense", test))] {
        pub type Simulation = compute_dense::Simulation;
    } else {
        // If no backend was specified, use a backend skeleton that throws a
        // minimal number of compiler errors.
        use compute::{Result, SimulateBase, SimulateStep};
        use data::{field::Field, parameters::Parameters};
        //
        pub struct Simulation(Parameters);
        //
        impl SimulateBase for Simulation {
            const NAME: &'static str = "none";

            fn new(_params: Parameters) -> Result<Self> {
                std::compile_error!("Please enable at least one compute backend via crate features")
            }

            fn parameters(&self) -> &Parameters {
                &self.0
            }
        }
        //
        impl SimulateStep for Simulation {
            fn perform_step(&self, _field: &mut Field) -> Result<()> {
                Ok(())
            }
        }
    }
}
