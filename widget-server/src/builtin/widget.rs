//! The `add_widget` action tool.

use serde::Serialize;
use serde_json::{Map, Value};
use widget_catalog::WidgetCatalog;
use widget_tools::{
    Arguments, ParamSpec, ParameterSchema, RegistryResult, ToolError, ToolRegistry, ToolResponse,
    ToolResult,
};

/// Number of columns and rows in the dashboard grid.
pub const GRID_SIZE: i64 = 4;

/// Action name the dashboard listens for.
pub const ADD_WIDGET_ACTION: &str = "addWidget";

pub(super) fn register(
    registry: &mut ToolRegistry,
    catalog: &WidgetCatalog,
) -> RegistryResult<()> {
    registry.register(
        "add_widget",
        describe_add_widget(catalog),
        schema(catalog),
        add_widget,
    )
}

/// Renders the `add_widget` description from the catalog.
///
/// Pure function of the catalog contents: the same catalog always yields the
/// same text.
#[must_use]
pub fn describe_add_widget(catalog: &WidgetCatalog) -> String {
    format!(
        "Add a widget to the dashboard and place it on the {GRID_SIZE}x{GRID_SIZE} grid. \
         column_index and row_index are 1-based and must be between 1 and {GRID_SIZE}. \
         column_span and row_span give the widget's width and height in cells; the widget \
         must stay inside the grid, so index + span - 1 may not exceed {GRID_SIZE}. \
         widget_name must be one of: {}.",
        catalog.render()
    )
}

fn schema(catalog: &WidgetCatalog) -> ParameterSchema {
    ParameterSchema::empty()
        .param(
            ParamSpec::string("widget_name")
                .one_of(catalog.names())
                .describe("Name of the widget to add"),
        )
        .param(
            ParamSpec::integer("column_index")
                .range(1, GRID_SIZE)
                .describe("Left-most column, starting at 1"),
        )
        .param(
            ParamSpec::integer("row_index")
                .range(1, GRID_SIZE)
                .describe("Top-most row, starting at 1"),
        )
        .param(
            ParamSpec::integer("column_span")
                .range(1, GRID_SIZE)
                .describe("Number of columns the widget covers"),
        )
        .param(
            ParamSpec::integer("row_span")
                .range(1, GRID_SIZE)
                .describe("Number of rows the widget covers"),
        )
}

/// Where a widget goes on the grid; serialised verbatim as the action args.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WidgetPlacement {
    /// Catalog name of the widget.
    pub widget_name: String,
    /// Left-most column, 1-based.
    pub column_index: i64,
    /// Top-most row, 1-based.
    pub row_index: i64,
    /// Width in columns.
    pub column_span: i64,
    /// Height in rows.
    pub row_span: i64,
}

impl WidgetPlacement {
    fn from_args(args: &Arguments) -> ToolResult<Self> {
        Ok(Self {
            widget_name: args.string("widget_name")?.to_owned(),
            column_index: grid_value(args, "column_index")?,
            row_index: grid_value(args, "row_index")?,
            column_span: grid_value(args, "column_span")?,
            row_span: grid_value(args, "row_span")?,
        })
    }

    /// Checks that the widget fits inside the grid.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArgument`] naming the span that overflows.
    pub fn check_fits(&self) -> ToolResult<()> {
        if self.column_index + self.column_span - 1 > GRID_SIZE {
            return Err(ToolError::invalid_argument(
                "column_span",
                format!(
                    "a widget at column {} spanning {} columns extends past column {GRID_SIZE}",
                    self.column_index, self.column_span
                ),
            ));
        }
        if self.row_index + self.row_span - 1 > GRID_SIZE {
            return Err(ToolError::invalid_argument(
                "row_span",
                format!(
                    "a widget at row {} spanning {} rows extends past row {GRID_SIZE}",
                    self.row_index, self.row_span
                ),
            ));
        }
        Ok(())
    }

    /// Instruction for the agent describing the placement.
    #[must_use]
    pub fn instruction(&self) -> String {
        format!(
            "The {} widget has been added to the dashboard at column {}, row {}, \
             spanning {} and {}. Tell the user the widget is now on their dashboard.",
            self.widget_name,
            self.column_index,
            self.row_index,
            plural(self.column_span, "column"),
            plural(self.row_span, "row"),
        )
    }

    fn into_action_args(self) -> ToolResult<Map<String, Value>> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ToolError::execution("placement did not serialise to an object")),
            Err(err) => Err(ToolError::execution(err.to_string())),
        }
    }
}

fn grid_value(args: &Arguments, name: &str) -> ToolResult<i64> {
    let value = args.integer(name)?;
    i64::try_from(value)
        .map_err(|_| ToolError::invalid_argument(name, format!("{value} is outside the grid")))
}

fn plural(count: i64, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

async fn add_widget(args: Arguments) -> ToolResult<ToolResponse> {
    let placement = WidgetPlacement::from_args(&args)?;
    placement.check_fits()?;
    let content = placement.instruction();
    let action_args = placement.into_action_args()?;
    ToolResponse::action(content, ADD_WIDGET_ACTION, action_args)
}
