use chrono::NaiveDate;
use std::sync::Arc;

use crate::database::{DatabaseError, FunctionArg, ProcedureResult, StoredFunctions};

/// Read-only guard roster queries served by `spr_guards`.
///
/// The function takes six positional parameters
/// `(p_query_type, p_date, p_its_id, p_miqaat_id, p_duty_id, p_team_id)`;
/// every call passes all six, unused ones as NULL.
#[derive(Clone)]
pub struct GuardsService {
    functions: Arc<dyn StoredFunctions>,
}

#[derive(Debug, Clone, Default)]
struct GuardsQuery {
    date: Option<NaiveDate>,
    its_id: Option<i32>,
    miqaat_id: Option<i32>,
    duty_id: Option<i32>,
    team_id: Option<i32>,
}

impl GuardsService {
    pub const FUNCTION: &'static str = "spr_guards";

    pub fn new(functions: Arc<dyn StoredFunctions>) -> Self {
        Self { functions }
    }

    pub async fn accepted_by_miqaat_date(&self, miqaat_date: NaiveDate) -> Result<ProcedureResult, DatabaseError> {
        self.query(
            "ACCEPTED-GUARDS-MIQAAT-DATE",
            GuardsQuery {
                date: Some(miqaat_date),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn guard_check(&self, its_id: i32) -> Result<ProcedureResult, DatabaseError> {
        self.query(
            "GUARD-CHECK",
            GuardsQuery {
                its_id: Some(its_id),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn all_with_duty(
        &self,
        miqaat_id: i32,
        duty_id: i32,
        team_id: i32,
    ) -> Result<ProcedureResult, DatabaseError> {
        self.query(
            "GET-ALL-GUARDS-WITH-DUTY",
            GuardsQuery {
                miqaat_id: Some(miqaat_id),
                duty_id: Some(duty_id),
                team_id: Some(team_id),
                ..Default::default()
            },
        )
        .await
    }

    async fn query(&self, query_type: &str, params: GuardsQuery) -> Result<ProcedureResult, DatabaseError> {
        let result = self
            .functions
            .call_json_function(
                Self::FUNCTION,
                &[
                    FunctionArg::text(query_type),
                    FunctionArg::Date(params.date),
                    FunctionArg::Int(params.its_id),
                    FunctionArg::Int(params.miqaat_id),
                    FunctionArg::Int(params.duty_id),
                    FunctionArg::Int(params.team_id),
                ],
            )
            .await?;

        tracing::debug!("{} result: {:?}", query_type, result);
        Ok(ProcedureResult::from_function_result(result))
    }
}
