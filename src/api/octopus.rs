//! [Octopus Energy](https://developer.octopus.energy) Kraken API client.

mod models;

use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use ureq::Agent;

pub use self::models::Direction;
use self::models::{
    AccountsData,
    Agreement,
    AgreementsData,
    HalfHourlyReadingsData,
    ObtainTokenData,
    Product,
    Response,
};
use crate::{
    core::{
        meter::{MeterPoint, Reading},
        source::{ReadingsQuery, ReadingsSource},
    },
    prelude::*,
};

const GRAPHQL_URL: &str = "https://api.octopus.energy/v1/graphql/";
const PRODUCTS_URL: &str = "https://api.octopus.energy/v1/products";

const OBTAIN_TOKEN_QUERY: &str = "mutation ObtainKrakenToken($input: ObtainJSONWebTokenInput!) { obtainKrakenToken(input: $input) { token } }";

const ACCOUNTS_QUERY: &str = "query Accounts { viewer { accounts { number } } }";

const AGREEMENTS_QUERY: &str = "query Agreements($accountNumber: String!) { account(accountNumber: $accountNumber) { electricityAgreements(active: true) { meterPoint { mpan meters(includeInactive: false) { id } } tariff { ... on TariffType { productCode } } } } }";

const READINGS_QUERY: &str = "query HalfHourlyReadings($mpan: String!, $meterId: ID!, $startAt: DateTime!, $first: Int!, $before: String) { electricityMeterPoint(mpan: $mpan) { meters(id: $meterId) { consumption(grouping: HALF_HOUR, startAt: $startAt, first: $first, before: $before) { edges { node { startAt endAt value } } } } } }";

pub struct Api {
    client: Agent,
    token: Option<String>,
}

/// Meter points of a single household.
#[must_use]
pub struct Household {
    pub import: MeterPoint,
    pub export: Option<MeterPoint>,
}

impl Household {
    /// The import meter point is required, an export meter point without meters is dropped.
    fn try_new(import: Option<MeterPoint>, export: Option<MeterPoint>) -> Result<Self> {
        let import = import.context("no import meter point found")?;
        ensure!(import.meter_id().is_some(), "the import meter point has no meters");
        let export = export.filter(|export| {
            let has_meters = export.meter_id().is_some();
            if !has_meters {
                warn!(mpan = %export.mpan, "ignoring the export meter point without meters");
            }
            has_meters
        });
        info!(
            import = %import.mpan,
            export = export.as_ref().map(|point| point.mpan.as_str()),
            "found",
        );
        Ok(Self { import, export })
    }
}

impl Api {
    pub fn new() -> Self {
        let client =
            Agent::config_builder().timeout_global(Some(Duration::from_secs(30))).build().into();
        Self { client, token: None }
    }

    #[instrument(skip_all)]
    pub fn authenticate(&mut self, api_key: &str) -> Result {
        #[derive(Serialize)]
        struct Variables<'a> {
            input: Input<'a>,
        }

        #[derive(Serialize)]
        struct Input<'a> {
            #[serde(rename = "APIKey")]
            api_key: &'a str,
        }

        info!("authenticating…");
        let data: ObtainTokenData = self
            .query(OBTAIN_TOKEN_QUERY, Variables { input: Input { api_key } })
            .context("authentication failed, check the API key")?;
        self.token = Some(data.obtain_kraken_token.token);
        Ok(())
    }

    #[instrument(skip_all)]
    pub fn account_numbers(&self) -> Result<Vec<String>> {
        let data: AccountsData = self.query(ACCOUNTS_QUERY, ())?;
        let numbers: Vec<_> =
            data.viewer.accounts.into_iter().map(|account| account.number).collect();
        info!(n_accounts = numbers.len(), "fetched");
        Ok(numbers)
    }

    #[instrument(skip_all, fields(account_number = account_number))]
    fn agreements(&self, account_number: &str) -> Result<Vec<Agreement>> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Variables<'a> {
            account_number: &'a str,
        }

        let data: AgreementsData = self.query(AGREEMENTS_QUERY, Variables { account_number })?;
        info!(n_agreements = data.account.electricity_agreements.len(), "fetched");
        Ok(data.account.electricity_agreements)
    }

    #[instrument(skip_all, fields(product_code = product_code))]
    pub fn product_direction(&self, product_code: &str) -> Result<Direction> {
        let product: Product = self
            .client
            .get(format!("{PRODUCTS_URL}/{product_code}/"))
            .call()
            .with_context(|| format!("failed to get product `{product_code}`"))?
            .body_mut()
            .read_json()
            .with_context(|| format!("failed to deserialize product `{product_code}`"))?;
        debug!(direction = ?product.direction);
        Ok(product.direction)
    }

    /// Find the import and export meter points among the account agreements.
    ///
    /// Without the account number, the first account having any agreements is used.
    #[instrument(skip_all)]
    pub fn household(&self, account_number: Option<&str>) -> Result<Household> {
        let agreements = match account_number {
            Some(account_number) => self.agreements(account_number)?,
            None => self.first_agreements()?,
        };

        let mut import = None;
        let mut export = None;
        for agreement in agreements {
            let direction = self.product_direction(&agreement.tariff.product_code)?;
            match direction {
                Direction::Import if import.is_none() => import = Some(agreement.meter_point),
                Direction::Export if export.is_none() => export = Some(agreement.meter_point),
                _ => {
                    warn!(?direction, mpan = %agreement.meter_point.mpan, "ignoring extra meter point");
                }
            }
        }
        Household::try_new(import, export)
    }

    fn first_agreements(&self) -> Result<Vec<Agreement>> {
        for account_number in self.account_numbers()? {
            let agreements = self.agreements(&account_number)?;
            if !agreements.is_empty() {
                return Ok(agreements);
            }
        }
        bail!("no electricity agreements found on any account")
    }

    #[instrument(skip_all, level = Level::DEBUG)]
    fn query<V, R>(&self, query: &'static str, variables: V) -> Result<R>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        #[derive(Serialize)]
        struct Request<V> {
            query: &'static str,
            variables: V,
        }

        let mut request = self.client.post(GRAPHQL_URL);
        if let Some(token) = &self.token {
            request = request.header("Authorization", token);
        }
        request
            .send_json(Request { query, variables })
            .context("failed to call the GraphQL API")?
            .body_mut()
            .read_json::<Response<R>>()
            .context("failed to deserialize the GraphQL response")?
            .into()
    }
}

impl ReadingsSource for Api {
    #[instrument(skip_all, fields(mpan = query.mpan, start_at = %query.start_at, first = query.first))]
    fn half_hourly_readings(&self, query: &ReadingsQuery<'_>) -> Result<Vec<Reading>> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Variables<'a> {
            mpan: &'a str,
            meter_id: &'a str,
            start_at: String,
            first: u32,
            before: Option<&'a str>,
        }

        let variables = Variables {
            mpan: query.mpan,
            meter_id: query.meter_id,
            start_at: query.start_at.to_rfc3339(),
            first: query.first,
            before: query.before,
        };
        let data: HalfHourlyReadingsData = self.query(READINGS_QUERY, variables)?;
        let readings = data.into_readings();
        debug!(n_readings = readings.len(), "fetched");
        Ok(readings)
    }
}
