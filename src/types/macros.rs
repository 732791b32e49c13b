macro_rules! runtime_type_impls {
    (
        simple_types: {
            $( $variant:ident => $name:literal, default: $default:expr ),* $(,)?
        },
        complex_types: {
            $(
                $complex_variant:ident
                $( ( $($tuple_arg:tt)* ) )?
            ),* $(,)?
        },
        get_name: {
            $( $name_pat:pat => $name_expr:expr ),* $(,)?
        },
        default_value: {
            $( $def_pat:pat => $def_expr:expr ),* $(,)?
        }
    ) => {
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub enum RuntimeType {
            $( $variant, )*
            $(
                $complex_variant
                $( ( $($tuple_arg)* ) )?,
            )*
        }

        impl RuntimeType {
            pub fn get_name(&self) -> String {
                use RuntimeType::*;
                match self {
                    $( $variant => $name.to_string(), )*
                    $( $name_pat => $name_expr, )*
                }
            }

            /// The value a freshly declared storage cell of this type holds.
            pub fn default_value(&self) -> Value {
                use RuntimeType::*;
                match self {
                    $( $variant => $default, )*
                    $( $def_pat => $def_expr, )*
                }
            }
        }
    };
}
