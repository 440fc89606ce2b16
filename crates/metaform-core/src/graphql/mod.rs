//! GraphQL operation synthesis from schema definitions.
//!
//! Every builder returns complete operation text; runtime values are bound
//! through variables so generated text is cacheable per schema version.

mod filter;
mod mutation;
mod query;
mod selection;

pub use filter::{default_order_by, search_filter};
pub use mutation::{
    batch_delete_mutation, bulk_insert_mutation, delete_mutation, insert_mutation, insert_payload,
    junction_delete_mutation, junction_insert_mutation, update_mutation, update_payload,
};
pub(crate) use mutation::fold_reference_values;
pub use query::{dependents_query, get_query, list_query, record_query};
pub use selection::{column_selection, reference_selection, relationship_selection, visible_columns};
