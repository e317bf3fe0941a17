//! Pure functions for calculating deployment plans (Functional Core).

use super::config::{KeyAttribute, TableConfig, Throughput};

/// Represents the current state of a table.
#[derive(Debug, Clone)]
pub struct TableState {
    pub status: TableStatus,
    pub partition_key: Option<KeyAttribute>,
    /// `None` for on-demand tables.
    pub throughput: Option<Throughput>,
}

/// Table status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Active,
    Creating,
    Updating,
    Deleting,
}

/// Planned changes for deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployPlan {
    /// Table doesn't exist, needs to be created.
    CreateTable { config: TableConfig },
    /// Table exists with a different capacity.
    UpdateThroughput {
        table_name: String,
        current: Option<Throughput>,
        desired: Throughput,
    },
    /// Table exists with another key; only a destroy can fix it.
    Incompatible { table_name: String, reason: String },
    /// Table is up to date, no changes needed.
    NoChanges { table_name: String },
}

/// Plan for destroying a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyPlan {
    /// Table exists and will be deleted.
    DeleteTable { table_name: String },
    /// Table doesn't exist, nothing to do.
    AlreadyGone { table_name: String },
}

/// Pure function: Calculate what changes are needed to reach desired state.
pub fn calculate_deploy_plan(current: Option<&TableState>, desired: &TableConfig) -> DeployPlan {
    let Some(state) = current else {
        return DeployPlan::CreateTable {
            config: desired.clone(),
        };
    };

    if state.partition_key.as_ref() != Some(&desired.partition_key) {
        let found = match &state.partition_key {
            Some(key) => format!("{} ({})", key.name, key.attribute_type.code()),
            None => "none".to_string(),
        };
        return DeployPlan::Incompatible {
            table_name: desired.table_name.clone(),
            reason: format!(
                "partition key is {found}, expected {} ({})",
                desired.partition_key.name,
                desired.partition_key.attribute_type.code()
            ),
        };
    }

    if state.throughput != Some(desired.throughput) {
        return DeployPlan::UpdateThroughput {
            table_name: desired.table_name.clone(),
            current: state.throughput,
            desired: desired.throughput,
        };
    }

    DeployPlan::NoChanges {
        table_name: desired.table_name.clone(),
    }
}

/// Pure function: Calculate destroy plan.
pub fn calculate_destroy_plan(current: Option<&TableState>, table_name: &str) -> DestroyPlan {
    match current {
        Some(_) => DestroyPlan::DeleteTable {
            table_name: table_name.to_string(),
        },
        None => DestroyPlan::AlreadyGone {
            table_name: table_name.to_string(),
        },
    }
}

fn format_throughput(throughput: Option<Throughput>) -> String {
    match throughput {
        Some(t) => format!("{} RCU / {} WCU", t.read, t.write),
        None => "PAY_PER_REQUEST".to_string(),
    }
}

/// Pure function: Format a deploy plan for display.
pub fn format_deploy_plan(plan: &DeployPlan) -> Vec<String> {
    match plan {
        DeployPlan::CreateTable { config } => vec![
            format!("+ Create table: {}", config.table_name),
            format!(
                "  Partition key: {} ({})",
                config.partition_key.name,
                config.partition_key.attribute_type.code()
            ),
            format!("  Billing: PROVISIONED ({})", format_throughput(Some(config.throughput))),
        ],
        DeployPlan::UpdateThroughput {
            table_name,
            current,
            desired,
        } => vec![
            format!("~ Update table: {}", table_name),
            format!(
                "  Capacity: {} -> {}",
                format_throughput(*current),
                format_throughput(Some(*desired))
            ),
        ],
        DeployPlan::Incompatible { table_name, reason } => {
            vec![format!("! Table '{}' {}", table_name, reason)]
        }
        DeployPlan::NoChanges { table_name } => {
            vec![format!("= Table '{}' is up to date", table_name)]
        }
    }
}

/// Pure function: Format a destroy plan for display.
pub fn format_destroy_plan(plan: &DestroyPlan) -> Vec<String> {
    match plan {
        DestroyPlan::DeleteTable { table_name } => {
            vec![format!(
                "- Delete table: {} (ALL DATA WILL BE LOST)",
                table_name
            )]
        }
        DestroyPlan::AlreadyGone { table_name } => {
            vec![format!("= Table '{}' does not exist", table_name)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamodb::config::{items_table_config, AttributeType};

    fn active(partition_key: KeyAttribute, throughput: Option<Throughput>) -> TableState {
        TableState {
            status: TableStatus::Active,
            partition_key: Some(partition_key),
            throughput,
        }
    }

    #[test]
    fn test_missing_table_is_created() {
        let desired = items_table_config().unwrap();
        let plan = calculate_deploy_plan(None, &desired);

        assert_eq!(
            plan,
            DeployPlan::CreateTable {
                config: desired.clone()
            }
        );
        let lines = format_deploy_plan(&plan);
        assert_eq!(lines[0], "+ Create table: items");
        assert_eq!(lines[1], "  Partition key: id (S)");
    }

    #[test]
    fn test_matching_table_has_no_changes() {
        let desired = items_table_config().unwrap();
        let state = active(desired.partition_key.clone(), Some(desired.throughput));

        assert_eq!(
            calculate_deploy_plan(Some(&state), &desired),
            DeployPlan::NoChanges {
                table_name: "items".to_string()
            }
        );
    }

    #[test]
    fn test_capacity_drift_is_updated() {
        let desired = items_table_config().unwrap();
        let state = active(desired.partition_key.clone(), None);

        let plan = calculate_deploy_plan(Some(&state), &desired);
        assert!(matches!(plan, DeployPlan::UpdateThroughput { current: None, .. }));
        assert_eq!(
            format_deploy_plan(&plan)[1],
            "  Capacity: PAY_PER_REQUEST -> 5 RCU / 5 WCU"
        );
    }

    #[test]
    fn test_other_partition_key_is_incompatible() {
        let desired = items_table_config().unwrap();
        let state = active(
            KeyAttribute {
                name: "PK".to_string(),
                attribute_type: AttributeType::String,
            },
            Some(desired.throughput),
        );

        let plan = calculate_deploy_plan(Some(&state), &desired);
        assert_eq!(
            plan,
            DeployPlan::Incompatible {
                table_name: "items".to_string(),
                reason: "partition key is PK (S), expected id (S)".to_string(),
            }
        );
    }

    #[test]
    fn test_destroy_plan() {
        let state = active(items_table_config().unwrap().partition_key, None);

        assert_eq!(
            calculate_destroy_plan(Some(&state), "items"),
            DestroyPlan::DeleteTable {
                table_name: "items".to_string()
            }
        );
        assert_eq!(
            format_destroy_plan(&calculate_destroy_plan(None, "items")),
            vec!["= Table 'items' does not exist".to_string()]
        );
    }
}
