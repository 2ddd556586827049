macro_rules! str {
    ($s:expr) => {
        $s.to_string()
    };
}

#[cfg(test)]
macro_rules! tvar {
    ($v:tt) => {
        $crate::typing::ty::TyVar::new(stringify!($v))
    };
}
