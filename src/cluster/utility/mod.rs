pub mod general_diagnostics;
