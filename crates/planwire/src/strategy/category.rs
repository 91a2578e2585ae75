//! Strategies for the environment-bound categories.
//!
//! A category member never travels by structure. Operators and plugins are
//! written by name and looked up again in the decoding environment; data
//! types are written as a [`TypeDescription`] and rebuilt by the decoding
//! environment's type factory; writables carry their own native bytes.

use std::any::type_name;

use crate::{
    Result,
    data_type::TypeDescription,
    error::Error,
    input::Input,
    output::Output,
    payload::{CategoryForm, CategoryValue, Payload},
    type_info::Category,
};

pub(crate) fn write<T: Payload>(
    category: Category,
    value: &T,
    output: &mut Output<'_>,
) -> Result<()> {
    let form = value.category_form(category)?;

    if form.category() != category {
        return Err(Error::CategoryMismatch {
            type_name: type_name::<T>(),
            category,
        });
    }

    match form {
        CategoryForm::Operator(name) | CategoryForm::Plugin(name) => {
            output.encoder().emit_str(name)?;
        }
        CategoryForm::DataType(description) => output.write(&description)?,
        CategoryForm::Writable(bytes) => output.encoder().emit_bytes(&bytes)?,
    }

    Ok(())
}

pub(crate) fn read<T: Payload>(
    category: Category,
    input: &mut Input<'_>,
) -> Result<T> {
    let value = match category {
        Category::Operator => {
            let name = input.decoder().read_str()?;
            let operator = input.context().catalog().lookup_operator(&name);
            let Some(operator) = operator else {
                return Err(Error::UnknownOperator(name));
            };
            CategoryValue::Operator(operator)
        }

        Category::DataType => {
            let description = input.read::<TypeDescription>()?;
            let data_type = input
                .context()
                .environment()
                .type_factory()
                .create(&description)
                .map_err(|source| Error::TypeFactory {
                    kind: description.kind,
                    source,
                })?;
            CategoryValue::DataType(data_type)
        }

        Category::Plugin => {
            let name = input.decoder().read_str()?;
            let Some(plugin) = input.context().plugins().plugin(&name) else {
                return Err(Error::UnknownPlugin(name));
            };
            CategoryValue::Plugin(plugin)
        }

        Category::Writable => {
            CategoryValue::Writable(input.decoder().read_bytes()?)
        }
    };

    tracing::trace!(
        type_name = type_name::<T>(),
        %category,
        "resolved category value"
    );

    T::from_category_value(value)
}
