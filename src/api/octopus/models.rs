use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use crate::{
    core::meter::{MeterPoint, Reading},
    prelude::*,
    quantity::energy::KilowattHours,
};

/// GraphQL response envelope.
#[derive(Deserialize)]
pub struct Response<R> {
    data: Option<R>,

    #[serde(default)]
    errors: Vec<ResponseError>,
}

#[derive(Deserialize)]
struct ResponseError {
    message: String,
}

impl<R> From<Response<R>> for Result<R> {
    fn from(response: Response<R>) -> Self {
        if let Some(error) = response.errors.first() {
            bail!(
                r#"Kraken error ("{message}", {n_errors} in total)"#,
                message = error.message,
                n_errors = response.errors.len(),
            );
        }
        response.data.ok_or_else(|| anyhow!("Kraken returned neither data nor errors"))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObtainTokenData {
    pub obtain_kraken_token: Token,
}

#[derive(Deserialize)]
pub struct Token {
    pub token: String,
}

#[derive(Deserialize)]
pub struct AccountsData {
    pub viewer: Viewer,
}

#[derive(Deserialize)]
pub struct Viewer {
    pub accounts: Vec<Account>,
}

#[derive(Deserialize)]
pub struct Account {
    pub number: String,
}

#[derive(Deserialize)]
pub struct AgreementsData {
    pub account: AccountAgreements,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAgreements {
    pub electricity_agreements: Vec<Agreement>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agreement {
    pub meter_point: MeterPoint,
    pub tariff: Tariff,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tariff {
    pub product_code: String,
}

#[derive(Deserialize)]
pub struct Product {
    pub direction: Direction,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Import,
    Export,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HalfHourlyReadingsData {
    electricity_meter_point: ReadingsMeterPoint,
}

#[derive(Deserialize)]
struct ReadingsMeterPoint {
    meters: Vec<ReadingsMeter>,
}

#[derive(Deserialize)]
struct ReadingsMeter {
    consumption: Connection,
}

#[derive(Deserialize)]
struct Connection {
    edges: Vec<Edge>,
}

#[derive(Deserialize)]
struct Edge {
    node: Node,
}

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Node {
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,

    /// Decimals come as strings.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    value: KilowattHours,
}

impl HalfHourlyReadingsData {
    /// Flatten the connection into the chronologically sorted readings.
    pub fn into_readings(self) -> Vec<Reading> {
        let mut readings: Vec<_> = self
            .electricity_meter_point
            .meters
            .into_iter()
            .flat_map(|meter| meter.consumption.edges)
            .map(|edge| Reading {
                start_at: edge.node.start_at,
                end_at: edge.node.end_at,
                value: edge.node.value,
            })
            .collect();
        readings.sort_by_key(|reading| reading.start_at);
        readings
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_deserialize_readings_ok() -> Result {
        // language=json
        let body = r#"{
            "data": {
                "electricityMeterPoint": {
                    "meters": [{
                        "consumption": {
                            "edges": [
                                {"node": {"startAt": "2025-06-02T09:30:00+01:00", "endAt": "2025-06-02T10:00:00+01:00", "value": "0.250"}},
                                {"node": {"startAt": "2025-06-02T09:00:00+01:00", "endAt": "2025-06-02T09:30:00+01:00", "value": 0.5}}
                            ]
                        }
                    }]
                }
            }
        }"#;
        let response: Response<HalfHourlyReadingsData> = serde_json::from_str(body)?;
        let readings = Result::<HalfHourlyReadingsData>::from(response)?.into_readings();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].start_at, Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap());
        assert_eq!(readings[0].end_at, Utc.with_ymd_and_hms(2025, 6, 2, 8, 30, 0).unwrap());
        assert_abs_diff_eq!(readings[0].value.0, 0.5);
        assert_abs_diff_eq!(readings[1].value.0, 0.25);
        Ok(())
    }

    #[test]
    fn test_deserialize_agreements_ok() -> Result {
        // language=json
        let body = r#"{
            "data": {
                "account": {
                    "electricityAgreements": [
                        {
                            "meterPoint": {"mpan": "1900000000000", "meters": [{"id": "42"}]},
                            "tariff": {"productCode": "AGILE-24-10-01"}
                        }
                    ]
                }
            }
        }"#;
        let response: Response<AgreementsData> = serde_json::from_str(body)?;
        let agreements = Result::<AgreementsData>::from(response)?.account.electricity_agreements;
        assert_eq!(agreements.len(), 1);
        assert_eq!(agreements[0].meter_point.mpan, "1900000000000");
        assert_eq!(agreements[0].meter_point.meter_id(), Some("42"));
        assert_eq!(agreements[0].tariff.product_code, "AGILE-24-10-01");
        Ok(())
    }

    #[test]
    fn test_deserialize_errors_fails() -> Result {
        // language=json
        let body = r#"{"data": null, "errors": [{"message": "Invalid data.", "path": ["obtainKrakenToken"]}]}"#;
        let response: Response<ObtainTokenData> = serde_json::from_str(body)?;
        let error = Result::<ObtainTokenData>::from(response).err().unwrap();
        assert!(error.to_string().contains("Invalid data."));
        Ok(())
    }

    #[test]
    fn test_deserialize_product_ok() -> Result {
        // language=json
        let body = r#"{"code": "OUTGOING-VAR-24-10-26", "direction": "EXPORT", "is_variable": true}"#;
        let product: Product = serde_json::from_str(body)?;
        assert_eq!(product.direction, Direction::Export);
        Ok(())
    }
}
