//! 工具箱：注册表、执行器与内置工具（calculator / weather / movie_info / knowledge_base / memory_*）

pub mod calculator;
pub mod executor;
pub mod knowledge_base;
pub mod memory_search;
pub mod movie;
pub mod registry;
pub mod schema;
pub mod weather;

pub use calculator::{calculate, CalcError, CalculatorTool};
pub use executor::ToolExecutor;
pub use knowledge_base::KnowledgeBaseTool;
pub use memory_search::{MemorySearchTool, MemorySummaryTool};
pub use movie::{movie_info, MovieInfoTool};
pub use registry::{Tool, ToolRegistry};
pub use schema::tool_call_schema_json;
pub use weather::WeatherTool;
