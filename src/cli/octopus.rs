use clap::Parser;

use crate::{
    api::octopus::{Api, Household},
    prelude::*,
};

#[derive(Parser)]
pub struct OctopusArgs {
    #[clap(long = "api-key", env = "OCTOPUS_API_KEY")]
    api_key: String,

    /// Defaults to the first account with any electricity agreements.
    #[clap(long = "account", env = "OCTOPUS_ACCOUNT_NUMBER")]
    account_number: Option<String>,
}

impl OctopusArgs {
    /// Authenticate and look up the household meter points.
    pub fn connect(&self) -> Result<(Api, Household)> {
        let mut api = Api::new();
        api.authenticate(&self.api_key)?;
        let household = api.household(self.account_number.as_deref())?;
        Ok((api, household))
    }
}
