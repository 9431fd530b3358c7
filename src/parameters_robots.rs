//! Hardcoded DH parameters for a few robots

pub mod ur_kinematics {
    use crate::parameters::ur_kinematics::Parameters;

    #[allow(dead_code)]
    impl Parameters {
        // Provides default values
        pub fn new() -> Self {
            Parameters {
                d1: 0.0,
                a2: 0.0,
                a3: 0.0,
                d4: 0.0,
                d5: 0.0,
                d6: 0.0,
            }
        }

        pub fn ur5() -> Self {
            Parameters {
                d1: 0.089159,
                a2: -0.425,
                a3: -0.39225,
                d4: 0.10915,
                d5: 0.09465,
                d6: 0.0823,
            }
        }

        pub fn ur3e() -> Self {
            Parameters {
                d1: 0.15185,
                a2: -0.24355,
                a3: -0.2132,
                d4: 0.13105,
                d5: 0.08535,
                d6: 0.0921,
            }
        }

        pub fn ur5e() -> Self {
            Parameters {
                d1: 0.1625,
                a2: -0.425,
                a3: -0.3922,
                d4: 0.1333,
                d5: 0.0997,
                d6: 0.0996,
            }
        }

        pub fn ur10e() -> Self {
            Parameters {
                d1: 0.1807,
                a2: -0.6127,
                a3: -0.57155,
                d4: 0.17415,
                d5: 0.11985,
                d6: 0.11655,
            }
        }

        /// Look up parameters by the model name as used in configuration files
        /// ("ur5", "ur3e", ...). A "_robot" suffix is accepted.
        pub fn by_model(model: &str) -> Option<Self> {
            match model.trim_end_matches("_robot").to_ascii_lowercase().as_str() {
                "ur5" => Some(Self::ur5()),
                "ur3e" => Some(Self::ur3e()),
                "ur5e" => Some(Self::ur5e()),
                "ur10e" => Some(Self::ur10e()),
                _ => None,
            }
        }
    }

    impl Default for Parameters {
        fn default() -> Self {
            Self::new()
        }
    }
}
