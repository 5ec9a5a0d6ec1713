// Test modules for the timing wheel
//
// 时间轮测试模块

#[cfg(test)]
mod wheel {
    mod advanced_tests;
    mod periodic_tests;
    mod scenario_tests;
}

#[cfg(test)]
mod driver {
    mod driver_tests;
}
