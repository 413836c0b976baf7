pub mod octopus;
